use crate::config::EnrichmentConfig;
use crate::models::MovieDetails;

/// Build the analysis prompt for one title.
///
/// Cast and crew share the same (first five) collaborator names; with no
/// collaborators both lines read `Unknown`.
pub fn build_prompt(details: &MovieDetails) -> String {
    let people: Vec<&str> = details
        .people
        .iter()
        .take(EnrichmentConfig::MAX_PROMPT_PEOPLE)
        .map(|p| p.primary_name.as_str())
        .collect();
    let people = if people.is_empty() {
        "Unknown".to_string()
    } else {
        people.join(", ")
    };

    let year = details.movie.start_year.as_deref().unwrap_or("N/A");

    format!(
        "Analyze the following title with a focus on its creative pedigree:\n\
         Title: {title} ({year})\n\
         Rating: {rating}\n\
         Key Cast: {people}\n\
         Key Crew (Director/Writers): {people}\n\
         \n\
         Please provide:\n\
         1. **Description**: A concise summary of the premise.\n\
         2. **The Pedigree**: Identify 2-3 standout previous works from the director and lead cast. \
         Mention if this team has collaborated before or if this genre is their \"sweet spot.\"\n\
         3. **The Verdict**: Based on the rating and the \"track record\" of the creators involved, \
         is this a must-watch or a skip?\n\
         4. **The Audience**: Who is this specifically for? \
         (e.g., \"Fans of slow-burn noir\" or \"Casual weekend viewers\").\n\
         5. **3 Similar Works**: Recommend titles that share a similar tone or stylistic 'feel'.\n\
         \n\
         Format in clean, minimal HTML using only <h3>, <p>, and <ul> tags.\n",
        title = details.movie.primary_title,
        year = year,
        rating = details.rating.average_rating,
        people = people,
    )
}

//! Title, rating and lookup types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DatasetConfig;

/// Kind of title as recorded in the `titleType` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TitleType {
    Movie,
    TvSeries,
    Short,
    Other(String),
}

impl TitleType {
    pub fn as_str(&self) -> &str {
        match self {
            TitleType::Movie => "movie",
            TitleType::TvSeries => "tvSeries",
            TitleType::Short => "short",
            TitleType::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "movie" => TitleType::Movie,
            "tvSeries" => TitleType::TvSeries,
            "short" => TitleType::Short,
            other => TitleType::Other(other.to_string()),
        }
    }

    /// Whether titles of this kind show up in search results.
    pub fn is_searchable(&self) -> bool {
        !matches!(self, TitleType::Other(_))
    }
}

impl From<String> for TitleType {
    fn from(raw: String) -> Self {
        TitleType::parse(&raw)
    }
}

impl From<TitleType> for String {
    fn from(kind: TitleType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TitleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the basics file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub tconst: String,
    pub primary_title: String,
    pub start_year: Option<String>,
    pub title_type: TitleType,
}

/// Average rating, or the `N/A` sentinel when the title has no rating row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageRating {
    Score(f32),
    #[default]
    NotAvailable,
}

impl AverageRating {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f32>() {
            Ok(score) if score.is_finite() => AverageRating::Score(score),
            _ => AverageRating::NotAvailable,
        }
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageRating::Score(score) => write!(f, "{:.1}", score),
            AverageRating::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// A row of the ratings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub tconst: String,
    pub average_rating: AverageRating,
    pub num_votes: u64,
}

impl RatingRecord {
    /// Rating used when the ratings file has no row for `tconst`.
    pub fn unrated(tconst: impl Into<String>) -> Self {
        Self {
            tconst: tconst.into(),
            average_rating: AverageRating::NotAvailable,
            num_votes: 0,
        }
    }
}

/// A cast or crew member named in the analysis prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub primary_name: String,
}

/// Everything known about one title, as fed to the analysis prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub movie: MovieRecord,
    pub rating: RatingRecord,
    /// Never populated by the dataset reader.
    pub people: Vec<Collaborator>,
}

/// Reduced projection of a [`MovieRecord`] returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub tconst: String,
    pub title: String,
    pub year: Option<String>,
}

impl From<&MovieRecord> for SearchResult {
    fn from(record: &MovieRecord) -> Self {
        Self {
            tconst: record.tconst.clone(),
            title: record.primary_title.clone(),
            year: record.start_year.clone(),
        }
    }
}

/// Input of request routing: a free-text query and an optional title id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub query: String,
    pub tconst: Option<String>,
}

impl LookupRequest {
    pub fn new(query: impl Into<String>, tconst: Option<String>) -> Self {
        Self {
            query: query.into(),
            tconst: tconst.filter(|id| !id.is_empty()),
        }
    }
}

/// Output of request routing. Rendering is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub analysis: Option<String>,
}

/// Interpret a raw dataset cell, mapping the null marker and blanks to `None`.
pub(crate) fn optional_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == DatasetConfig::NULL_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

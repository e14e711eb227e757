//! Dataset reader for the local IMDb-style title files.
//!
//! Both operations are linear scans: there is no index, and the files are
//! treated as static. `search` and `fetch_by_id` never fail; the `try_`
//! variants expose the underlying [`CinelensError`] for callers (and tests)
//! that need to tell a missing file from a malformed one.

mod chunked;

pub use chunked::{TsvChunks, TsvHeader, TsvRow};

use crate::config::{DatasetConfig, ServiceConfig};
use crate::error::{CinelensError, Result};
use crate::models::{
    optional_cell, AverageRating, MovieDetails, MovieRecord, RatingRecord, SearchResult,
    TitleType,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Column positions in the basics file.
struct BasicsColumns {
    tconst: usize,
    title_type: usize,
    primary_title: usize,
    start_year: usize,
}

impl BasicsColumns {
    fn from_header(header: &TsvHeader) -> Result<Self> {
        Ok(Self {
            tconst: header.index_of("tconst")?,
            title_type: header.index_of("titleType")?,
            primary_title: header.index_of("primaryTitle")?,
            start_year: header.index_of("startYear")?,
        })
    }

    fn record(&self, row: &TsvRow) -> MovieRecord {
        MovieRecord {
            tconst: row.cell(self.tconst).to_string(),
            primary_title: row.cell(self.primary_title).to_string(),
            start_year: optional_cell(row.cell(self.start_year)),
            title_type: TitleType::parse(row.cell(self.title_type)),
        }
    }
}

/// Column positions in the ratings file.
struct RatingsColumns {
    tconst: usize,
    average_rating: usize,
    num_votes: usize,
}

impl RatingsColumns {
    fn from_header(header: &TsvHeader) -> Result<Self> {
        Ok(Self {
            tconst: header.index_of("tconst")?,
            average_rating: header.index_of("averageRating")?,
            num_votes: header.index_of("numVotes")?,
        })
    }

    fn record(&self, row: &TsvRow) -> RatingRecord {
        RatingRecord {
            tconst: row.cell(self.tconst).to_string(),
            average_rating: AverageRating::parse(row.cell(self.average_rating)),
            num_votes: row.cell(self.num_votes).trim().parse::<u64>().unwrap_or(0),
        }
    }
}

/// Streams the basics and ratings files under a data directory.
#[derive(Debug, Clone)]
pub struct DatasetReader {
    basics_path: PathBuf,
    ratings_path: PathBuf,
    chunk_size: usize,
}

impl DatasetReader {
    /// Create a reader over `data_dir` with the default chunk size.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            basics_path: data_dir.join(DatasetConfig::BASICS_FILE),
            ratings_path: data_dir.join(DatasetConfig::RATINGS_FILE),
            chunk_size: DatasetConfig::CHUNK_SIZE,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            basics_path: config.basics_path(),
            ratings_path: config.ratings_path(),
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Override the number of rows held in memory per chunk.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn basics_path(&self) -> &Path {
        &self.basics_path
    }

    pub fn ratings_path(&self) -> &Path {
        &self.ratings_path
    }

    /// Search titles whose primary title contains `query`, case-insensitively.
    ///
    /// Returns at most `limit` results in file order. Missing or malformed
    /// data is logged and yields an empty list.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.try_search(query, limit) {
            Ok(results) => results,
            Err(e) if e.is_missing_data() => {
                error!("Dataset files missing: {}", e);
                Vec::new()
            }
            Err(e) => {
                error!("Search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Fallible form of [`DatasetReader::search`].
    pub fn try_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.ensure_files_present()?;

        let mut results = Vec::new();
        if limit == 0 {
            return Ok(results);
        }

        info!("Searching for '{}' in local dataset", query);
        let started = Instant::now();
        let needle = query.to_lowercase();

        let mut chunks = TsvChunks::open(&self.basics_path, self.chunk_size)?;
        let columns = BasicsColumns::from_header(chunks.header())?;

        for chunk in &mut chunks {
            for row in chunk? {
                if !TitleType::parse(row.cell(columns.title_type)).is_searchable() {
                    continue;
                }
                if !row
                    .cell(columns.primary_title)
                    .to_lowercase()
                    .contains(&needle)
                {
                    continue;
                }

                results.push(SearchResult::from(&columns.record(&row)));
                if results.len() >= limit {
                    info!(
                        "Found {} matches in {:.2}s",
                        results.len(),
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(results);
                }
            }
        }

        info!(
            "Search for '{}' finished with {} matches in {:.2}s",
            query,
            results.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(results)
    }

    /// Look up a title and its rating by exact identifier.
    ///
    /// Returns `None` when the title is absent or the data cannot be read.
    pub fn fetch_by_id(&self, tconst: &str) -> Option<MovieDetails> {
        match self.try_fetch_by_id(tconst) {
            Ok(details) => details,
            Err(e) => {
                error!("Fetching '{}' failed: {}", tconst, e);
                None
            }
        }
    }

    /// Fallible form of [`DatasetReader::fetch_by_id`].
    pub fn try_fetch_by_id(&self, tconst: &str) -> Result<Option<MovieDetails>> {
        self.ensure_files_present()?;
        info!("Fetching exact data for ID: {}", tconst);

        let Some(movie) = self.find_basics(tconst)? else {
            return Ok(None);
        };

        let rating = match self.find_rating(tconst)? {
            Some(rating) => rating,
            None => {
                warn!("No rating row for '{}', using defaults", tconst);
                RatingRecord::unrated(tconst)
            }
        };

        Ok(Some(MovieDetails {
            movie,
            rating,
            people: Vec::new(),
        }))
    }

    fn ensure_files_present(&self) -> Result<()> {
        for path in [&self.basics_path, &self.ratings_path] {
            if !path.is_file() {
                return Err(CinelensError::MissingDataFile(path.clone()));
            }
        }
        Ok(())
    }

    fn find_basics(&self, tconst: &str) -> Result<Option<MovieRecord>> {
        let mut chunks = TsvChunks::open(&self.basics_path, self.chunk_size)?;
        let columns = BasicsColumns::from_header(chunks.header())?;

        for chunk in &mut chunks {
            if let Some(row) = chunk?.iter().find(|row| row.cell(columns.tconst) == tconst) {
                return Ok(Some(columns.record(row)));
            }
        }
        Ok(None)
    }

    fn find_rating(&self, tconst: &str) -> Result<Option<RatingRecord>> {
        let mut chunks = TsvChunks::open(&self.ratings_path, self.chunk_size)?;
        let columns = RatingsColumns::from_header(chunks.header())?;

        for chunk in &mut chunks {
            if let Some(row) = chunk?.iter().find(|row| row.cell(columns.tconst) == tconst) {
                return Ok(Some(columns.record(row)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASICS: &str = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n\
tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short\n\
tt0078748\tmovie\tAlien\tAlien\t0\t1979\t\\N\t117\tHorror,Sci-Fi\n\
tt0090605\tmovie\tAliens\tAliens\t0\t1986\t\\N\t137\tAction,Adventure,Sci-Fi\n\
tt0118583\tvideoGame\tAlien Trilogy\tAlien Trilogy\t0\t1996\t\\N\t\\N\tAction\n\
tt0944947\ttvSeries\tGame of Thrones\tGame of Thrones\t0\t2011\t2019\t57\tAction,Adventure,Drama\n\
tt1234567\ttvEpisode\tAlien Visitors\tAlien Visitors\t0\t\\N\t\\N\t\\N\tSci-Fi\n\
tt9999999\tmovie\tUntitled Alien Project\tUntitled Alien Project\t0\t\\N\t\\N\t\\N\t\\N\n";

    const RATINGS: &str = "tconst\taverageRating\tnumVotes\n\
tt0000001\t5.7\t2100\n\
tt0078748\t8.5\t970000\n";

    fn setup_with(basics: &str, ratings: &str) -> (TempDir, DatasetReader) {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DatasetConfig::BASICS_FILE), basics).unwrap();
        std::fs::write(temp_dir.path().join(DatasetConfig::RATINGS_FILE), ratings).unwrap();
        let reader = DatasetReader::new(temp_dir.path()).with_chunk_size(2);
        (temp_dir, reader)
    }

    fn setup() -> (TempDir, DatasetReader) {
        setup_with(BASICS, RATINGS)
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.tconst.as_str()).collect()
    }

    #[test]
    fn test_search_filters_type_and_title() {
        let (_temp, reader) = setup();
        let results = reader.search("ALIEN", 10);
        assert_eq!(ids(&results), vec!["tt0078748", "tt0090605", "tt9999999"]);
        assert_eq!(results[0].title, "Alien");
        assert_eq!(results[0].year.as_deref(), Some("1979"));
        assert_eq!(results[2].year, None);
    }

    #[test]
    fn test_search_stops_at_limit_mid_chunk() {
        let (_temp, reader) = setup();
        let reader = reader.with_chunk_size(100);
        let results = reader.search("alien", 2);
        assert_eq!(ids(&results), vec!["tt0078748", "tt0090605"]);
    }

    #[test]
    fn test_search_stops_before_later_malformed_rows() {
        let basics = "tconst\ttitleType\tprimaryTitle\tstartYear\n\
tt1\tmovie\tAlien\t1979\n\
tt2\tmovie\tAliens\t1986\n\
tt3\tmovie\n\
tt4\tmovie\tAlien 3\t1992\n";
        let (_temp, reader) = setup_with(basics, RATINGS);

        let results = reader.try_search("alien", 2).unwrap();
        assert_eq!(ids(&results), vec!["tt1", "tt2"]);

        let err = reader.try_search("alien", 3).unwrap_err();
        assert!(matches!(err, CinelensError::MalformedRow { line: 4, .. }));
    }

    #[test]
    fn test_search_no_match() {
        let (_temp, reader) = setup();
        assert!(reader.search("zzz-no-such-title", 10).is_empty());
        assert!(reader.search("alien", 0).is_empty());
    }

    #[test]
    fn test_search_keeps_duplicates() {
        let basics = "tconst\ttitleType\tprimaryTitle\tstartYear\n\
tt1\tmovie\tHamlet\t1948\n\
tt2\tmovie\tHamlet\t1990\n\
tt3\tmovie\tHamlet\t1996\n";
        let (_temp, reader) = setup_with(basics, RATINGS);
        let results = reader.search("hamlet", 10);
        assert_eq!(ids(&results), vec!["tt1", "tt2", "tt3"]);
    }

    #[test]
    fn test_search_missing_ratings_file_returns_empty() {
        let (temp, reader) = setup();
        std::fs::remove_file(temp.path().join(DatasetConfig::RATINGS_FILE)).unwrap();
        assert!(reader.search("alien", 10).is_empty());
        assert!(matches!(
            reader.try_search("alien", 10),
            Err(CinelensError::MissingDataFile(_))
        ));
    }

    #[test]
    fn test_search_malformed_returns_empty() {
        let basics = "tconst\ttitleType\tprimaryTitle\tstartYear\n\
tt1\tmovie\tAlien\t1979\n\
tt2\tmovie\n";
        let (_temp, reader) = setup_with(basics, RATINGS);
        assert!(reader.search("zzz", 10).is_empty());
        assert!(matches!(
            reader.try_search("zzz", 10),
            Err(CinelensError::MalformedRow { line: 3, .. })
        ));
    }

    #[test]
    fn test_fetch_by_id_with_rating() {
        let (_temp, reader) = setup();
        let details = reader.fetch_by_id("tt0078748").unwrap();
        assert_eq!(details.movie.primary_title, "Alien");
        assert_eq!(details.movie.start_year.as_deref(), Some("1979"));
        assert_eq!(details.movie.title_type, TitleType::Movie);
        assert_eq!(details.rating.average_rating, AverageRating::Score(8.5));
        assert_eq!(details.rating.num_votes, 970000);
        assert!(details.people.is_empty());
    }

    #[test]
    fn test_fetch_by_id_without_rating_uses_defaults() {
        let (_temp, reader) = setup();
        let details = reader.fetch_by_id("tt0944947").unwrap();
        assert_eq!(details.rating.average_rating, AverageRating::NotAvailable);
        assert_eq!(details.rating.num_votes, 0);
    }

    #[test]
    fn test_fetch_first_match_wins() {
        let basics = "tconst\ttitleType\tprimaryTitle\tstartYear\n\
tt1\tmovie\tFirst\t2000\n\
tt1\tmovie\tSecond\t2001\n";
        let (_temp, reader) = setup_with(basics, RATINGS);
        assert_eq!(reader.fetch_by_id("tt1").unwrap().movie.primary_title, "First");
    }

    #[test]
    fn test_fetch_absent_does_not_read_ratings() {
        // A malformed ratings file would fail the lookup if it were opened.
        let (_temp, reader) = setup_with(BASICS, "not\ta\tratings\nfile\n");
        assert!(matches!(reader.try_fetch_by_id("tt7654321"), Ok(None)));
        assert!(reader.fetch_by_id("tt0078748").is_none());
    }

    #[test]
    fn test_fetch_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let reader = DatasetReader::new(temp_dir.path());
        assert!(reader.fetch_by_id("tt0078748").is_none());
        assert!(reader.try_fetch_by_id("tt0078748").unwrap_err().is_missing_data());
    }
}

//! Movie lookup service: search, fetch and cached analysis.

use crate::cache::FileCache;
use crate::config::ServiceConfig;
use crate::dataset::DatasetReader;
use crate::enrichment::{build_prompt, GeminiClient, TextGenerator};
use crate::error::Result;
use crate::models::{LookupRequest, LookupResponse, MovieDetails, SearchResult};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Fragment returned when the title id is not in the dataset.
pub const NOT_FOUND_HTML: &str = "<div>Error: Movie data not found in local dataset.</div>";
/// Fragment returned when the generation service reports a quota error.
pub const QUOTA_EXCEEDED_HTML: &str = "<div>Quota Reached. Try again in 60s.</div>";

/// Result of [`MovieService::analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Served from the cache without touching the dataset or network.
    Cached(String),
    /// Freshly generated and written to the cache.
    Generated(String),
    NotFound,
    QuotaExceeded,
    /// Generation failed; carries the error message.
    Failed(String),
}

impl AnalysisOutcome {
    /// HTML fragment shown to the user for this outcome.
    pub fn to_html(&self) -> String {
        match self {
            AnalysisOutcome::Cached(text) | AnalysisOutcome::Generated(text) => text.clone(),
            AnalysisOutcome::NotFound => NOT_FOUND_HTML.to_string(),
            AnalysisOutcome::QuotaExceeded => QUOTA_EXCEEDED_HTML.to_string(),
            AnalysisOutcome::Failed(message) => format!("<div>Error: {}</div>", message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            AnalysisOutcome::Cached(_) | AnalysisOutcome::Generated(_)
        )
    }
}

/// Composes the dataset reader, the analysis cache and a text generator.
pub struct MovieService {
    dataset: DatasetReader,
    cache: FileCache,
    generator: Box<dyn TextGenerator>,
    search_limit: usize,
}

impl std::fmt::Debug for MovieService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieService")
            .field("dataset", &self.dataset)
            .field("cache", &self.cache)
            .field("model", &self.generator.model())
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

impl MovieService {
    /// Build a service backed by Gemini from process configuration.
    ///
    /// Creates the cache directory if it does not exist.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let generator = GeminiClient::from_config(config)?;
        Self::with_generator(config, Box::new(generator))
    }

    /// Build a service with an explicit generator.
    pub fn with_generator(
        config: &ServiceConfig,
        generator: Box<dyn TextGenerator>,
    ) -> Result<Self> {
        Ok(Self {
            dataset: DatasetReader::from_config(config),
            cache: FileCache::new(&config.cache_dir)?,
            generator,
            search_limit: config.search_limit,
        })
    }

    pub fn dataset(&self) -> &DatasetReader {
        &self.dataset
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Case-insensitive title search, capped at `limit` results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.dataset.search(query, limit)
    }

    /// Exact lookup of a title and its rating.
    pub fn fetch_by_id(&self, tconst: &str) -> Option<MovieDetails> {
        self.dataset.fetch_by_id(tconst)
    }

    /// Produce the analysis for `tconst`, serving from the cache when possible.
    ///
    /// Only a successful generation is written to the cache. At most one
    /// generation call is made per invocation.
    pub async fn analyze(&self, tconst: &str) -> AnalysisOutcome {
        match self.cache.get(tconst) {
            Ok(Some(cached)) if !cached.is_empty() => return AnalysisOutcome::Cached(cached),
            Ok(_) => {}
            Err(e) => warn!("Cache read for '{}' failed, treating as miss: {}", tconst, e),
        }

        let Some(details) = self.dataset.fetch_by_id(tconst) else {
            return AnalysisOutcome::NotFound;
        };

        let prompt = build_prompt(&details);
        info!(
            "Sending '{}' to {} for analysis",
            details.movie.primary_title,
            self.generator.model()
        );

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                info!("Analysis generated successfully for '{}'", tconst);
                if let Err(e) = self.cache.put(tconst, &text) {
                    error!("Failed to cache analysis for '{}': {}", tconst, e);
                }
                AnalysisOutcome::Generated(text)
            }
            Err(e) if e.is_rate_limited() => {
                error!("Quota exceeded (rate limit): {}", e);
                AnalysisOutcome::QuotaExceeded
            }
            Err(e) => {
                error!("Analysis failed for '{}': {}", tconst, e);
                AnalysisOutcome::Failed(e.to_string())
            }
        }
    }

    /// [`MovieService::analyze`] rendered to its HTML fragment.
    pub async fn analyze_html(&self, tconst: &str) -> String {
        self.analyze(tconst).await.to_html()
    }

    /// Route a lookup request.
    ///
    /// A query alone searches; a query with an id analyzes that id; anything
    /// else yields an empty response.
    pub async fn handle(&self, request: &LookupRequest) -> LookupResponse {
        let mut response = LookupResponse {
            query: request.query.clone(),
            ..LookupResponse::default()
        };

        if request.query.is_empty() {
            return response;
        }

        match request.tconst.as_deref() {
            None => response.results = self.search(&request.query, self.search_limit),
            Some(tconst) => response.analysis = Some(self.analyze_html(tconst).await),
        }
        response
    }
}

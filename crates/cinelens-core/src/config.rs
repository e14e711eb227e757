//! Centralized configuration for Cinelens.
//!
//! Constant holders describe the fixed contracts (dataset file names, cache
//! layout, enrichment defaults). [`ServiceConfig`] is the process-wide
//! configuration resolved once at startup and handed to each component.

use crate::error::{CinelensError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Dataset layout and scan parameters.
pub struct DatasetConfig;

impl DatasetConfig {
    pub const BASICS_FILE: &'static str = "title.basics.tsv";
    pub const RATINGS_FILE: &'static str = "title.ratings.tsv";
    pub const CHUNK_SIZE: usize = 100_000;
    pub const DEFAULT_SEARCH_LIMIT: usize = 10;
    /// Marker the dataset uses for a null cell.
    pub const NULL_MARKER: &'static str = "\\N";
}

/// On-disk analysis cache layout.
pub struct CacheConfig;

impl CacheConfig {
    pub const FILE_EXTENSION: &'static str = "html";
}

/// Defaults for the text-generation service.
pub struct EnrichmentConfig;

impl EnrichmentConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_API_BASE: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    pub const API_KEY_HEADER: &'static str = "x-goog-api-key";
    pub const USER_AGENT: &'static str = "Cinelens/0.1";
    /// Number of collaborator names embedded in a prompt.
    pub const MAX_PROMPT_PEOPLE: usize = 5;
}

/// Environment variable names read by [`ServiceConfig::from_env`].
pub struct EnvVars;

impl EnvVars {
    pub const DATA_DIR: &'static str = "CINELENS_DATA_DIR";
    pub const CACHE_DIR: &'static str = "CINELENS_CACHE_DIR";
    pub const API_KEY: &'static str = "GEMINI_API_KEY";
    pub const MODEL: &'static str = "CINELENS_MODEL";
    pub const API_BASE: &'static str = "GEMINI_API_BASE";
    pub const REQUEST_TIMEOUT_SECS: &'static str = "CINELENS_REQUEST_TIMEOUT_SECS";
}

/// Process-wide configuration for a [`crate::MovieService`].
#[derive(Clone)]
pub struct ServiceConfig {
    /// Directory holding the basics and ratings TSV files.
    pub data_dir: PathBuf,
    /// Directory holding one cached analysis per title.
    pub cache_dir: PathBuf,
    /// Credential for the generation service.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// Total timeout for the generation call. `None` leaves the HTTP client default.
    pub request_timeout: Option<Duration>,
    /// Rows per chunk when scanning dataset files.
    pub chunk_size: usize,
    /// Result cap used by request routing.
    pub search_limit: usize,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("data_dir", &self.data_dir)
            .field("cache_dir", &self.cache_dir)
            .field("has_api_key", &self.api_key.is_some())
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .field("chunk_size", &self.chunk_size)
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_dir: PathBuf::from("ai_cache"),
            api_key: None,
            model: EnrichmentConfig::DEFAULT_MODEL.to_string(),
            api_base: EnrichmentConfig::DEFAULT_API_BASE.to_string(),
            request_timeout: None,
            chunk_size: DatasetConfig::CHUNK_SIZE,
            search_limit: DatasetConfig::DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Unset variables fall back to [`ServiceConfig::default`]. An empty
    /// `GEMINI_API_KEY` counts as unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(EnvVars::DATA_DIR).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(EnvVars::CACHE_DIR).filter(|v| !v.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        config.api_key = lookup(EnvVars::API_KEY).filter(|v| !v.trim().is_empty());
        if let Some(model) = lookup(EnvVars::MODEL).filter(|v| !v.is_empty()) {
            config.model = model;
        }
        if let Some(base) = lookup(EnvVars::API_BASE).filter(|v| !v.is_empty()) {
            url::Url::parse(&base).map_err(|e| CinelensError::Config {
                message: format!(
                    "{} is not a valid URL ({}): {}",
                    EnvVars::API_BASE,
                    base,
                    e
                ),
            })?;
            config.api_base = base;
        }
        let timeout = lookup(EnvVars::REQUEST_TIMEOUT_SECS).filter(|v| !v.is_empty());
        if let Some(secs) = timeout {
            let secs = secs.parse::<u64>().map_err(|e| CinelensError::Config {
                message: format!(
                    "{} must be a whole number of seconds: {}",
                    EnvVars::REQUEST_TIMEOUT_SECS,
                    e
                ),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn basics_path(&self) -> PathBuf {
        self.data_dir.join(DatasetConfig::BASICS_FILE)
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join(DatasetConfig::RATINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cache_dir, PathBuf::from("ai_cache"));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.api_key.is_none());
        assert!(config.request_timeout.is_none());
        assert_eq!(config.chunk_size, 100_000);
        assert_eq!(config.search_limit, 10);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("CINELENS_DATA_DIR", "/srv/imdb"),
            ("CINELENS_CACHE_DIR", "/var/cache/cinelens"),
            ("GEMINI_API_KEY", "secret"),
            ("CINELENS_MODEL", "gemini-2.0-pro"),
            ("CINELENS_REQUEST_TIMEOUT_SECS", "45"),
        ]))
        .unwrap();

        assert_eq!(config.basics_path(), PathBuf::from("/srv/imdb/title.basics.tsv"));
        assert_eq!(config.ratings_path(), PathBuf::from("/srv/imdb/title.ratings.tsv"));
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/cinelens"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ServiceConfig::from_lookup(lookup_from(&[(
            "CINELENS_REQUEST_TIMEOUT_SECS",
            "soon"
        )]))
        .is_err());
        assert!(
            ServiceConfig::from_lookup(lookup_from(&[("GEMINI_API_BASE", "not a url")])).is_err()
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ServiceConfig {
            api_key: Some("secret".into()),
            ..ServiceConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("has_api_key: true"));
    }
}

//! Cinelens Core - local movie lookup with cached AI analysis.
//!
//! Reads IMDb-style `title.basics.tsv` / `title.ratings.tsv` files in chunks,
//! and produces an HTML analysis of a title through a text-generation
//! service, caching each successful result as one file per title.
//!
//! The crate is headless: rendering and the request surface live with the
//! caller (see the `cinelens-cli` crate).
//!
//! # Example
//!
//! ```rust,ignore
//! use cinelens_core::{LookupRequest, MovieService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> cinelens_core::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let service = MovieService::from_config(&config)?;
//!
//!     for hit in service.search("alien", 10) {
//!         println!("{} {}", hit.tconst, hit.title);
//!     }
//!
//!     println!("{}", service.analyze_html("tt0078748").await);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use cache::FileCache;
pub use config::ServiceConfig;
pub use dataset::DatasetReader;
pub use enrichment::{build_prompt, GeminiClient, TextGenerator};
pub use error::{CinelensError, Result};
pub use models::{
    AverageRating, Collaborator, LookupRequest, LookupResponse, MovieDetails, MovieRecord,
    RatingRecord, SearchResult, TitleType,
};
pub use service::{AnalysisOutcome, MovieService, NOT_FOUND_HTML, QUOTA_EXCEEDED_HTML};

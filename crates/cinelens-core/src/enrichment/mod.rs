//! AI enrichment: prompt construction and the text-generation seam.
//!
//! # Module Organization
//!
//! - [`gemini`] - HTTP client for the Gemini `generateContent` endpoint
//! - [`prompt`] - Analysis prompt built from a title's details

mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::build_prompt;

use crate::error::Result;
use async_trait::async_trait;

/// A backend that turns a prompt into generated text.
///
/// The service owns one boxed generator; tests substitute fakes.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submit `prompt` and return the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

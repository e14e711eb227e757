//! Client for the Gemini `generateContent` REST endpoint.
//!
//! Sends a single text prompt and returns the concatenated text parts of the
//! first candidate. A 429 response becomes [`CinelensError::RateLimited`];
//! any other non-success status becomes [`CinelensError::Generation`] with
//! the response body as the message.

use super::TextGenerator;
use crate::config::{EnrichmentConfig, ServiceConfig};
use crate::error::{CinelensError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini text-generation client.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for `model` using the default API base.
    ///
    /// A missing key is only reported when a request is made.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        Self::build(
            api_key,
            model.into(),
            EnrichmentConfig::DEFAULT_API_BASE.to_string(),
            None,
        )
    }

    /// Create a client from process configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::build(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base.clone(),
            config.request_timeout,
        )
    }

    fn build(
        api_key: Option<String>,
        model: String,
        api_base: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(EnrichmentConfig::USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| CinelensError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            cause: None,
        })?;

        Ok(Self {
            client,
            api_key,
            model,
            api_base,
        })
    }

    /// Full URL of the `generateContent` call for this client's model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    async fn check_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());

            warn!("Gemini quota exceeded (retry after {:?}s)", retry_after);
            return Err(CinelensError::RateLimited {
                service: service_name(&self.api_base),
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(CinelensError::Generation {
            message: format!("{} {}", status, body.trim()),
            status_code: Some(status.as_u16()),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| CinelensError::Config {
            message: "GEMINI_API_KEY is not set".to_string(),
        })?;

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = self.endpoint();
        debug!("POST {} ({} prompt bytes)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header(EnrichmentConfig::API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;
        let response = self.check_response_status(response).await?;

        let text = response.text().await?;
        extract_text(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull the generated text out of a `generateContent` response body.
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CinelensError::Generation {
            message: "response contained no text".to_string(),
            status_code: None,
        });
    }
    Ok(text)
}

fn service_name(api_base: &str) -> String {
    url::Url::parse(api_base)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

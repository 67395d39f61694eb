//! Text Extraction Client — turns a hosted document URL into plain text via the
//! external extraction service.
//!
//! One attempt per call, no retries. Retry/skip policy belongs to the
//! orchestrator, which drops documents that fail extraction rather than
//! aborting their siblings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("extraction service returned empty text")]
    EmptyText,
}

/// Seam for the extraction backend. The orchestrator only sees this trait,
/// so tests substitute deterministic doubles.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, location_uri: &str) -> Result<String, ExtractError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    file_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

/// HTTP client for the document-to-text extraction service.
/// Wire contract: POST `{ "fileUrl": <uri> }`, response `{ "text": <string> }`.
#[derive(Clone)]
pub struct HttpTextExtractor {
    client: Client,
    endpoint: String,
}

impl HttpTextExtractor {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract(&self, location_uri: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ExtractRequest {
                file_url: location_uri,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ExtractResponse = response.json().await?;
        if payload.text.trim().is_empty() {
            return Err(ExtractError::EmptyText);
        }

        debug!(
            "Extracted {} chars from {}",
            payload.text.len(),
            location_uri
        );
        Ok(payload.text)
    }
}

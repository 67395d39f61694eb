//! AI Analysis Client — the single point of entry for all Gemini calls.
//!
//! ARCHITECTURAL RULE: no other module may call the Gemini API directly.
//! The orchestrator depends on the `BatchAnalyzer` trait, never on this
//! client's concrete type, so tests substitute deterministic doubles.
//!
//! The client is stateless and attempts exactly one model call per invocation.
//! Fallback on failure (sentinel placeholders) is the orchestrator's job.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::matching::model::CandidateAnalysis;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all scoring calls.
pub const MODEL: &str = "gemini-2.0-flash";

/// Separates the instruction section from the CV payload in the final prompt.
const CV_CONTENT_DELIMITER: &str = "---CV CONTENT---";

/// The six rubric categories, in wire (camelCase) spelling. Must stay in sync
/// with `CategoryBreakdown`.
const ANALYSIS_CATEGORIES: [&str; 6] = [
    "experience",
    "hardSkills",
    "education",
    "softSkills",
    "experienceDiversity",
    "locationProximity",
];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned empty response text")]
    EmptyResponse,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response shape mismatch: {0}")]
    Shape(String),
}

/// Seam between the orchestrator and the model backend.
#[async_trait]
pub trait BatchAnalyzer: Send + Sync {
    /// Scores every CV in `combined_cv_text` against the rubric in `prompt`.
    /// One model call; any failure is returned whole, never a partial result.
    async fn analyze_batch(
        &self,
        prompt: &str,
        combined_cv_text: &str,
    ) -> Result<Vec<CandidateAnalysis>, AnalysisError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extracts the text of the first candidate's first text part.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Response schema
// ────────────────────────────────────────────────────────────────────────────

fn category_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {"type": "INTEGER"},
            "reasoning": {"type": "STRING"}
        },
        "required": ["score", "reasoning"]
    })
}

/// Gemini response schema: an array of per-candidate analysis objects covering
/// all six categories. Passed via `generationConfig.responseSchema` so the
/// model is constrained to strictly-typed JSON output.
fn response_schema() -> Value {
    let mut categories = serde_json::Map::new();
    for name in ANALYSIS_CATEGORIES {
        categories.insert(name.to_string(), category_schema());
    }

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "fileName": {"type": "STRING"},
                "matchScore": {"type": "INTEGER"},
                "analysis": {
                    "type": "OBJECT",
                    "properties": Value::Object(categories),
                    "required": ANALYSIS_CATEGORIES
                }
            },
            "required": ["fileName", "matchScore", "analysis"]
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini client used by the matching pipeline.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl BatchAnalyzer for GeminiClient {
    async fn analyze_batch(
        &self,
        prompt: &str,
        combined_cv_text: &str,
    ) -> Result<Vec<CandidateAnalysis>, AnalysisError> {
        let full_prompt = format!("{prompt}\n\n{CV_CONTENT_DELIMITER}\n{combined_cv_text}");

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &full_prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text().ok_or(AnalysisError::EmptyResponse)?;

        let analyses = parse_analyses(text)?;
        debug!("Gemini call succeeded: {} analyses returned", analyses.len());
        Ok(analyses)
    }
}

/// Parses model output text into analyses. Two stages so the caller can tell
/// malformed JSON from well-formed JSON of the wrong shape.
fn parse_analyses(text: &str) -> Result<Vec<CandidateAnalysis>, AnalysisError> {
    let text = strip_json_fences(text);

    let value: Value = serde_json::from_str(text)?;
    serde_json::from_value(value).map_err(|e| AnalysisError::Shape(e.to_string()))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// The response schema should prevent fences, but the guard is kept because
/// the text is parsed, not trusted.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

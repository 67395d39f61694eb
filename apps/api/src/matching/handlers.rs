use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cache::cache_key;
use crate::errors::AppError;
use crate::matching::model::{CandidateAnalysis, DocumentRef, ExtractionWarning};
use crate::matching::pipeline::{MatchPipeline, PipelineOptions};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub documents: Vec<DocumentRef>,
    pub job_description: String,
    /// Cap on returned candidates. Defaults from config; clamped to ≥ 1.
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub cached: bool,
    pub candidates: Vec<CandidateAnalysis>,
    pub warnings: Vec<ExtractionWarning>,
}

/// POST /api/v1/matches
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    if req.documents.is_empty() {
        return Err(AppError::Validation(
            "documents must not be empty".to_string(),
        ));
    }
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription must not be empty".to_string(),
        ));
    }

    let top_n = req.top_n.unwrap_or(state.config.default_top_n).max(1);
    let request_id = Uuid::new_v4();
    info!(
        "Match request {request_id}: {} documents, topN={top_n}",
        req.documents.len()
    );

    let key = cache_key(&req.job_description, &req.documents, top_n);
    if let Some(ranked) = state.cache.get(&key).await {
        return Ok(Json(MatchResponse {
            request_id,
            analyzed_at: Utc::now(),
            cached: true,
            candidates: ranked.candidates,
            warnings: ranked.warnings,
        }));
    }

    let pipeline = MatchPipeline::new(
        state.extractor.clone(),
        state.analyzer.clone(),
        PipelineOptions {
            batch_size: state.config.batch_size,
            max_concurrent_extractions: state.config.max_concurrent_extractions,
            max_concurrent_analyses: state.config.max_concurrent_analyses,
            call_timeout: std::time::Duration::from_secs(state.config.call_timeout_secs),
        },
    );

    let ranked = pipeline
        .run(&req.documents, &req.job_description, top_n)
        .await
        .map_err(|e| AppError::Pipeline(e.to_string()))?;

    state.cache.put(&key, &ranked).await;

    info!(
        "Match request {request_id} done: {} candidates, {} warnings",
        ranked.candidates.len(),
        ranked.warnings.len()
    );

    Ok(Json(MatchResponse {
        request_id,
        analyzed_at: Utc::now(),
        cached: false,
        candidates: ranked.candidates,
        warnings: ranked.warnings,
    }))
}

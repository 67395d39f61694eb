pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/matches", post(handlers::handle_match))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::cache::ResultCache;
    use crate::config::Config;
    use crate::extraction::{ExtractError, TextExtractor};
    use crate::gemini::{AnalysisError, BatchAnalyzer};
    use crate::matching::model::CandidateAnalysis;

    struct NoopExtractor;

    #[async_trait]
    impl TextExtractor for NoopExtractor {
        async fn extract(&self, _location_uri: &str) -> Result<String, ExtractError> {
            Err(ExtractError::EmptyText)
        }
    }

    struct NoopAnalyzer;

    #[async_trait]
    impl BatchAnalyzer for NoopAnalyzer {
        async fn analyze_batch(
            &self,
            _prompt: &str,
            _combined_cv_text: &str,
        ) -> Result<Vec<CandidateAnalysis>, AnalysisError> {
            Err(AnalysisError::EmptyResponse)
        }
    }

    fn test_state() -> AppState {
        // redis::Client::open only parses the URL; nothing connects unless a
        // handler actually reaches the cache.
        let redis = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        AppState {
            extractor: Arc::new(NoopExtractor),
            analyzer: Arc::new(NoopAnalyzer),
            cache: ResultCache::new(redis, 60),
            config: Config {
                redis_url: "redis://127.0.0.1:1/".to_string(),
                gemini_api_key: "test-key".to_string(),
                extractor_url: "http://127.0.0.1:1/extract".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                batch_size: 3,
                default_top_n: 5,
                max_concurrent_extractions: 4,
                max_concurrent_analyses: 4,
                call_timeout_secs: 1,
                cache_ttl_secs: 60,
            },
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_documents_rejected_with_400() {
        let app = build_router(test_state());
        let body = serde_json::json!({
            "documents": [],
            "jobDescription": "Rust engineer"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/matches")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_job_description_rejected_with_400() {
        let app = build_router(test_state());
        let body = serde_json::json!({
            "documents": [{"fileName": "a.pdf", "url": "https://blob.example/a.pdf"}],
            "jobDescription": "   "
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/matches")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

use std::sync::Arc;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::gemini::BatchAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Extractor and analyzer are trait objects so tests wire in doubles.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub analyzer: Arc<dyn BatchAnalyzer>,
    pub cache: ResultCache,
    pub config: Config,
}

//! Batch Orchestrator — drives the full matching pipeline.
//!
//! Flow: extract (bounded fan-out, best-effort) → batch → analyze (bounded
//! fan-out, sentinel fallback per batch) → merge (stable sort, truncate).
//!
//! Isolation invariants: one document's extraction failure never aborts its
//! siblings; one batch's analysis failure never affects other batches. The
//! only whole-call failure is a task join error escaping those boundaries.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::extraction::TextExtractor;
use crate::gemini::BatchAnalyzer;
use crate::matching::batch::{combine_batches, split_batch_key, CvBatch};
use crate::matching::model::{
    CandidateAnalysis, DocumentRef, ExtractedCv, ExtractionWarning, RankedMatches,
};
use crate::matching::prompts::build_scoring_prompt;

/// The pipeline's only error path: a spawned task panicked or was aborted.
/// Per-document and per-batch failures are recovered inside `run`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Fan-out limits and timeouts for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub batch_size: usize,
    pub max_concurrent_extractions: usize,
    pub max_concurrent_analyses: usize,
    pub call_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_concurrent_extractions: 4,
            max_concurrent_analyses: 4,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// The matching pipeline. Clients are injected so callers own their lifecycle
/// and tests swap in doubles.
pub struct MatchPipeline {
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn BatchAnalyzer>,
    options: PipelineOptions,
}

impl MatchPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn BatchAnalyzer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            options,
        }
    }

    /// Runs the pipeline for one request and returns up to `top_n` candidates
    /// sorted by `match_score` descending (ties keep encounter order), plus
    /// warnings for documents dropped at extraction. `top_n` below 1 is
    /// clamped to 1; the result is never padded.
    pub async fn run(
        &self,
        documents: &[DocumentRef],
        job_description: &str,
        top_n: usize,
    ) -> Result<RankedMatches, PipelineError> {
        let top_n = top_n.max(1);

        let (extracted, warnings) = self.extract_all(documents).await?;
        info!(
            "Extracted {}/{} documents ({} dropped)",
            extracted.len(),
            documents.len(),
            warnings.len()
        );

        if extracted.is_empty() {
            return Ok(RankedMatches {
                candidates: Vec::new(),
                warnings,
            });
        }

        let batches = combine_batches(&extracted, self.options.batch_size);
        info!(
            "Analyzing {} batches of up to {} CVs",
            batches.len(),
            self.options.batch_size
        );

        let prompt = Arc::new(build_scoring_prompt(job_description));
        let mut candidates = self.analyze_all(batches, prompt).await?;

        // Stable sort: ties keep encounter order across batches.
        candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        candidates.truncate(top_n);

        Ok(RankedMatches {
            candidates,
            warnings,
        })
    }

    /// Extracts every document concurrently under the extraction semaphore.
    /// Failures become warnings; successes are returned in input order so
    /// batching stays contiguous over the caller's ordering.
    async fn extract_all(
        &self,
        documents: &[DocumentRef],
    ) -> Result<(Vec<ExtractedCv>, Vec<ExtractionWarning>), PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_extractions));
        let mut handles = Vec::with_capacity(documents.len());

        for doc in documents {
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&semaphore);
            let doc = doc.clone();
            let call_timeout = self.options.call_timeout;

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err((doc.file_name, "extraction pool closed".to_string()));
                    }
                };

                match timeout(call_timeout, extractor.extract(&doc.url)).await {
                    Ok(Ok(text)) => Ok(ExtractedCv {
                        file_name: doc.file_name,
                        text,
                    }),
                    Ok(Err(e)) => Err((doc.file_name, e.to_string())),
                    Err(_) => Err((
                        doc.file_name,
                        format!("extraction timed out after {}s", call_timeout.as_secs()),
                    )),
                }
            }));
        }

        let mut extracted = Vec::with_capacity(documents.len());
        let mut warnings = Vec::new();

        // Awaiting in spawn order keeps successes in input order even though
        // the tasks complete in any order.
        for handle in handles {
            match handle.await? {
                Ok(cv) => extracted.push(cv),
                Err((file_name, reason)) => {
                    warn!("Dropping {file_name}: {reason}");
                    warnings.push(ExtractionWarning { file_name, reason });
                }
            }
        }

        Ok((extracted, warnings))
    }

    /// Analyzes every batch concurrently under the analysis semaphore. A failed
    /// batch yields one sentinel per member (recovered from the batch key), so
    /// each batch contributes exactly as many results as it has members.
    async fn analyze_all(
        &self,
        batches: Vec<CvBatch>,
        prompt: Arc<String>,
    ) -> Result<Vec<CandidateAnalysis>, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_analyses));
        let mut handles = Vec::with_capacity(batches.len());

        for batch in batches {
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let prompt = Arc::clone(&prompt);
            let call_timeout = self.options.call_timeout;

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("Analysis pool closed; substituting sentinels for batch {}", batch.key);
                        return sentinel_batch(&batch.key);
                    }
                };

                match timeout(call_timeout, analyzer.analyze_batch(&prompt, &batch.combined_text))
                    .await
                {
                    Ok(Ok(analyses)) => analyses,
                    Ok(Err(e)) => {
                        warn!("Analysis failed for batch {}: {e}", batch.key);
                        sentinel_batch(&batch.key)
                    }
                    Err(_) => {
                        warn!(
                            "Analysis timed out after {}s for batch {}",
                            call_timeout.as_secs(),
                            batch.key
                        );
                        sentinel_batch(&batch.key)
                    }
                }
            }));
        }

        let mut candidates = Vec::new();
        for handle in handles {
            candidates.extend(handle.await?);
        }

        Ok(candidates)
    }
}

/// One zero-score sentinel per member of a failed batch.
fn sentinel_batch(batch_key: &str) -> Vec<CandidateAnalysis> {
    split_batch_key(batch_key)
        .iter()
        .map(|file_name| CandidateAnalysis::failed(file_name))
        .collect()
}

//! Batcher — groups extracted CV texts into fixed-size contiguous batches and
//! serializes each batch into one delimited blob for prompting.

use crate::matching::model::ExtractedCv;

/// Separator between file names inside a batch key. The key doubles as the
/// recovery key: when a batch's analysis fails, splitting it back yields the
/// members that need sentinel placeholders.
const BATCH_KEY_SEPARATOR: char = ',';

/// A group of CVs destined for a single model call.
///
/// Invariant: the order of file names in `key` matches the order their texts
/// appear in `combined_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct CvBatch {
    /// Comma-joined member file names, in input order.
    pub key: String,
    /// Member texts concatenated under `--- CV <file name> ---` headers.
    pub combined_text: String,
}

/// Partitions `items` into contiguous batches of at most `batch_size`, in input
/// order. The last batch may be short. `batch_size` below 1 is clamped to 1.
pub fn combine_batches(items: &[ExtractedCv], batch_size: usize) -> Vec<CvBatch> {
    let batch_size = batch_size.max(1);

    items
        .chunks(batch_size)
        .map(|members| {
            let key = members
                .iter()
                .map(|cv| cv.file_name.as_str())
                .collect::<Vec<_>>()
                .join(&BATCH_KEY_SEPARATOR.to_string());

            let combined_text = members
                .iter()
                .map(|cv| format!("--- CV {} ---\n{}\n", cv.file_name, cv.text))
                .collect::<Vec<_>>()
                .join("\n");

            CvBatch { key, combined_text }
        })
        .collect()
}

/// Splits a batch key back into its member file names.
pub fn split_batch_key(key: &str) -> Vec<String> {
    key.split(BATCH_KEY_SEPARATOR)
        .map(|name| name.to_string())
        .collect()
}

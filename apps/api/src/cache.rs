//! Result cache — best-effort Redis read-through for ranked results.
//!
//! The cache is never load-bearing: any Redis failure logs and falls through
//! to a fresh pipeline run. Keys are content-addressed over the request, so a
//! changed job description, document set, or topN misses cleanly.

use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::matching::model::{DocumentRef, RankedMatches};

const KEY_PREFIX: &str = "cvmatch:result:";

/// Deterministic cache key for one matching request.
pub fn cache_key(job_description: &str, documents: &[DocumentRef], top_n: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job_description.as_bytes());
    hasher.update([0u8]);
    for doc in documents {
        hasher.update(doc.file_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.url.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(top_n.to_le_bytes());

    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{KEY_PREFIX}{hex}")
}

#[derive(Clone)]
pub struct ResultCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl ResultCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    pub async fn get(&self, key: &str) -> Option<RankedMatches> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable, skipping cache read: {e}");
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache read failed: {e}");
                return None;
            }
        };

        raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(ranked) => {
                debug!("Cache hit for {key}");
                Some(ranked)
            }
            Err(e) => {
                // Stale or corrupt entry; treat as a miss and let the fresh
                // result overwrite it.
                warn!("Discarding unreadable cache entry {key}: {e}");
                None
            }
        })
    }

    pub async fn put(&self, key: &str, ranked: &RankedMatches) {
        let json = match serde_json::to_string(ranked) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize result for caching: {e}");
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable, skipping cache write: {e}");
                return;
            }
        };

        let written: redis::RedisResult<()> = conn.set_ex(key, json, self.ttl_secs).await;
        if let Err(e) = written {
            warn!("Cache write failed: {e}");
        }
    }
}

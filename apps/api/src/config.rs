use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Required variables fail startup; tunables fall back to defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub gemini_api_key: String,
    pub extractor_url: String,
    pub port: u16,
    pub rust_log: String,
    /// CVs per model call. Batching amortizes the fixed prompt overhead.
    pub batch_size: usize,
    pub default_top_n: usize,
    pub max_concurrent_extractions: usize,
    pub max_concurrent_analyses: usize,
    /// Applied per outbound call (extraction and analysis alike).
    pub call_timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            extractor_url: require_env("EXTRACTOR_URL")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            batch_size: parse_tunable("CV_BATCH_SIZE", 3)?.max(1),
            default_top_n: parse_tunable("DEFAULT_TOP_N", 5)?.max(1),
            max_concurrent_extractions: parse_tunable("MAX_CONCURRENT_EXTRACTIONS", 4)?.max(1),
            max_concurrent_analyses: parse_tunable("MAX_CONCURRENT_ANALYSES", 4)?.max(1),
            call_timeout_secs: parse_tunable("CALL_TIMEOUT_SECS", 60)?.max(1) as u64,
            cache_ttl_secs: parse_tunable("CACHE_TTL_SECS", 3600)?.max(1) as u64,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_tunable(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub cache_ttl: Duration,
    /// Upper bound on entries held by each response cache.
    pub cache_max_entries: u64,
    pub cache_sweep_interval: Duration,
    pub max_upload_bytes: usize,
    /// Token budget for the enhancement call and its repair pass.
    pub enhance_max_tokens: u32,
    /// Enables the education honors-track post-pass in grounding.
    pub split_honors_tracks: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cache_ttl: Duration::from_secs(parse_env("CACHE_TTL_SECS", 3600)?),
            cache_max_entries: parse_env("CACHE_MAX_ENTRIES", 1000)?,
            cache_sweep_interval: Duration::from_secs(parse_env("CACHE_SWEEP_INTERVAL_SECS", 300)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            enhance_max_tokens: parse_env("ENHANCE_MAX_TOKENS", 4096)?,
            split_honors_tracks: parse_env("SPLIT_HONORS_TRACKS", true)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

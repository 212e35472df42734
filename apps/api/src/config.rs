use std::num::{NonZeroU32, NonZeroU64};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::matching::MatchMode;

const DEFAULT_LANGUAGETOOL_URL: &str = "https://api.languagetool.org/v2";
const DEFAULT_RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(15) {
    Some(n) => n,
    None => unreachable!(),
};
const DEFAULT_RATE_WINDOW: NonZeroU64 = match NonZeroU64::new(60) {
    Some(n) => n,
    None => unreachable!(),
};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values abort startup, as does a
/// zero grammar rate limit or window.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub languagetool_url: String,
    pub grammar_language: String,
    pub grammar_rate_limit: NonZeroU32,
    pub grammar_rate_window_secs: NonZeroU64,
    pub grammar_timeout_secs: u64,
    /// Check once at startup that the grammar engine supports `grammar_language`.
    pub grammar_preflight: bool,
    pub max_upload_bytes: usize,
    pub match_mode: MatchMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            languagetool_url: std::env::var("LANGUAGETOOL_URL")
                .unwrap_or_else(|_| DEFAULT_LANGUAGETOOL_URL.to_string()),
            grammar_language: std::env::var("GRAMMAR_LANGUAGE")
                .unwrap_or_else(|_| "en-GB".to_string()),
            grammar_rate_limit: parse_env("GRAMMAR_RATE_LIMIT", DEFAULT_RATE_LIMIT)?,
            grammar_rate_window_secs: parse_env("GRAMMAR_RATE_WINDOW_SECS", DEFAULT_RATE_WINDOW)?,
            grammar_timeout_secs: parse_env("GRAMMAR_TIMEOUT_SECS", 30)?,
            grammar_preflight: parse_env("GRAMMAR_PREFLIGHT", true)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            match_mode: parse_env("MATCH_MODE", MatchMode::Substring)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
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

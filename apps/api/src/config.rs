use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; missing ones fall back to the defaults below.
///
/// Layout time grows with word count and canvas size. A request that runs past
/// `LAYOUT_TIMEOUT_MS` comes back as a partial result with `timedOut = true`,
/// so raise the timeout together with `MAX_WORDS` or `MAX_CANVAS_PX`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Server-wide cap on layout time. Requests may only shorten it.
    pub layout_timeout_ms: u64,
    pub max_words: usize,
    /// Largest accepted canvas width or height.
    pub max_canvas_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            rust_log: "info".to_string(),
            layout_timeout_ms: 10_000,
            max_words: 1_000,
            max_canvas_px: 2_048,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            layout_timeout_ms: env_or("LAYOUT_TIMEOUT_MS", defaults.layout_timeout_ms)?,
            max_words: env_or("MAX_WORDS", defaults.max_words)?,
            max_canvas_px: env_or("MAX_CANVAS_PX", defaults.max_canvas_px)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

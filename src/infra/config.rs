//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Retry policy for the classification gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each one after.
    pub base_backoff: Duration,
    /// Upper bound for a single attempt.
    pub attempt_timeout: Duration,
    /// Upper bound across all attempts and backoff.
    pub total_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(10),
            total_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub classifier_url: Option<String>,
    pub retry: RetryPolicy,
    pub max_upload_bytes: usize,
    pub translator_url: Option<String>,
    pub translator_api_key: Option<String>,
    pub translator_timeout: Duration,
    pub tts_url: Option<String>,
    pub static_root: PathBuf,
    pub label_mapping_path: Option<PathBuf>,
    pub seed_demo_data: bool,
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://products.db".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            classifier_url: None,
            retry: RetryPolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            translator_url: None,
            translator_api_key: None,
            translator_timeout: Duration::from_millis(3000),
            tts_url: None,
            static_root: PathBuf::from("static"),
            label_mapping_path: None,
            seed_demo_data: false,
            cors_allow_origin: None,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment (after loading `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let retry_defaults = RetryPolicy::default();

        let max_attempts: u32 = parse_or(&get, "CLASSIFIER_MAX_ATTEMPTS", retry_defaults.max_attempts)?;
        if max_attempts == 0 {
            anyhow::bail!("CLASSIFIER_MAX_ATTEMPTS must be at least 1");
        }

        let retry = RetryPolicy {
            max_attempts,
            base_backoff: Duration::from_millis(parse_or(&get, "CLASSIFIER_BACKOFF_MS", 250u64)?),
            attempt_timeout: Duration::from_secs(parse_or(
                &get,
                "CLASSIFIER_ATTEMPT_TIMEOUT_SECS",
                retry_defaults.attempt_timeout.as_secs(),
            )?),
            total_timeout: Duration::from_secs(parse_or(
                &get,
                "CLASSIFIER_TOTAL_TIMEOUT_SECS",
                retry_defaults.total_timeout.as_secs(),
            )?),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            classifier_url: get("CLASSIFIER_URL"),
            retry,
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            translator_url: get("TRANSLATOR_URL"),
            translator_api_key: get("TRANSLATOR_API_KEY"),
            translator_timeout: Duration::from_millis(parse_or(
                &get,
                "TRANSLATOR_TIMEOUT_MS",
                defaults.translator_timeout.as_millis() as u64,
            )?),
            tts_url: get("TTS_URL"),
            static_root: get("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_root),
            label_mapping_path: get("LABEL_MAPPING_PATH").map(PathBuf::from),
            seed_demo_data: parse_or(&get, "SEED_DEMO_DATA", false)?,
            cors_allow_origin: get("CORS_ALLOW_ORIGIN"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

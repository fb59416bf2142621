use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `https://api.example.com`.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Quiet period before a debounced notes edit is persisted.
    pub notes_debounce_ms: u64,
    /// Storage quota for uploaded documents, reported by `storage_usage()`.
    pub document_quota_bytes: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("API_BASE_URL")?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            notes_debounce_ms: env_or("NOTES_DEBOUNCE_MS", "1000")
                .parse::<u64>()
                .context("NOTES_DEBOUNCE_MS must be a number of milliseconds")?,
            document_quota_bytes: env_or("DOCUMENT_QUOTA_BYTES", "52428800")
                .parse::<u64>()
                .context("DOCUMENT_QUOTA_BYTES must be a byte count")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            notes_debounce_ms: 1000,
            document_quota_bytes: 50 * 1024 * 1024,
            rust_log: "info".to_string(),
        }
    }
}

/// Initializes structured logging. Call once from the embedding app.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

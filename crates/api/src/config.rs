use std::time::Duration;

use catalog_core::bulk::{DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_TTL};

use crate::auth::jwt::JwtConfig;
use crate::engine::executor::ExecutorSettings;

/// Default upload limit for bulk files: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default bound on one batch transaction.
const DEFAULT_BATCH_TIMEOUT_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight bulk operations (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Largest accepted request body, in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Bulk operation engine settings.
    pub bulk: BulkConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            jwt: JwtConfig::from_env(),
            bulk: BulkConfig::from_env(),
        }
    }
}

/// Settings for the bulk operation engine.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    /// Rows per batch transaction (default: `100`, minimum `1`).
    pub batch_size: usize,
    /// Upper bound on one batch transaction in seconds (default: `60`).
    pub batch_timeout_secs: u64,
    /// Progress snapshot retention in seconds (default: `300`).
    pub progress_ttl_secs: u64,
    /// `redis://` URL for the progress store; `None` keeps it in-process.
    pub progress_store_url: Option<String>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout_secs: DEFAULT_BATCH_TIMEOUT_SECS,
            progress_ttl_secs: DEFAULT_PROGRESS_TTL.as_secs(),
            progress_store_url: None,
        }
    }
}

impl BulkConfig {
    /// Load bulk settings from environment variables.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `BULK_BATCH_SIZE`         | `100`   |
    /// | `BULK_BATCH_TIMEOUT_SECS` | `60`    |
    /// | `BULK_PROGRESS_TTL_SECS`  | `300`   |
    /// | `PROGRESS_STORE_URL`      | unset   |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let batch_size: usize = std::env::var("BULK_BATCH_SIZE")
            .ok()
            .map(|v| v.parse().expect("BULK_BATCH_SIZE must be a valid usize"))
            .unwrap_or(defaults.batch_size);

        let batch_timeout_secs: u64 = std::env::var("BULK_BATCH_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("BULK_BATCH_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(defaults.batch_timeout_secs);

        let progress_ttl_secs: u64 = std::env::var("BULK_PROGRESS_TTL_SECS")
            .ok()
            .map(|v| v.parse().expect("BULK_PROGRESS_TTL_SECS must be a valid u64"))
            .unwrap_or(defaults.progress_ttl_secs);

        let progress_store_url = std::env::var("PROGRESS_STORE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            batch_size: batch_size.max(1),
            batch_timeout_secs,
            progress_ttl_secs,
            progress_store_url,
        }
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            batch_size: self.batch_size.max(1),
            batch_timeout: Duration::from_secs(self.batch_timeout_secs),
            progress_ttl: Duration::from_secs(self.progress_ttl_secs),
        }
    }
}

use std::path::PathBuf;

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
    /// Directory holding uploaded media (PK-data files).
    pub media_root: PathBuf,
    /// Ap Predict engine connection settings.
    pub ap_predict: ApPredictConfig,
}

/// Connection settings for the external Ap Predict engine.
#[derive(Debug, Clone)]
pub struct ApPredictConfig {
    /// Base URL launch POSTs and collection GETs go to.
    pub endpoint: String,
    /// Per-request HTTP client timeout in seconds.
    pub timeout_secs: u64,
    /// Stall window in seconds: a run whose progress label has not changed
    /// for longer than this is marked failed.
    pub status_timeout_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                  |
    /// |-----------------------------|--------------------------|
    /// | `HOST`                      | `0.0.0.0`                |
    /// | `PORT`                      | `3000`                   |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                     |
    /// | `MEDIA_ROOT`                | `media`                  |
    /// | `AP_PREDICT_ENDPOINT`       | `http://localhost:8080`  |
    /// | `AP_PREDICT_TIMEOUT`        | `30`                     |
    /// | `AP_PREDICT_STATUS_TIMEOUT` | `300`                    |
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

        let media_root = PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let ap_predict = ApPredictConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            media_root,
            ap_predict,
        }
    }
}

impl ApPredictConfig {
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("AP_PREDICT_ENDPOINT").unwrap_or_else(|_| "http://localhost:8080".into());

        let timeout_secs: u64 = std::env::var("AP_PREDICT_TIMEOUT")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("AP_PREDICT_TIMEOUT must be a valid u64");

        let status_timeout_secs: i64 = std::env::var("AP_PREDICT_STATUS_TIMEOUT")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("AP_PREDICT_STATUS_TIMEOUT must be a valid i64");

        Self {
            endpoint,
            timeout_secs,
            status_timeout_secs,
        }
    }
}

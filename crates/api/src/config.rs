use std::time::Duration;

use crate::response::TimeoutResponse;

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
    /// Per-invocation handler timeout in seconds; `0` disables it (default: `0`).
    pub job_timeout_secs: u64,
    /// How timed-out triggers are reported (default: `abort`).
    pub timeout_response: TimeoutResponse,
    /// Largest accepted trigger payload in bytes; `0` means no limit (default: `0`).
    pub max_payload_bytes: usize,
    /// How long in-flight triggers may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default    |
    /// |------------------------|------------|
    /// | `HOST`                 | `0.0.0.0`  |
    /// | `PORT`                 | `3000`     |
    /// | `JOB_TIMEOUT_SECS`     | `0`        |
    /// | `JOB_TIMEOUT_RESPONSE` | `abort`    |
    /// | `JOB_MAX_PAYLOAD_BYTES`| `0`        |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        let timeout_response: TimeoutResponse = std::env::var("JOB_TIMEOUT_RESPONSE")
            .unwrap_or_else(|_| "abort".into())
            .parse()
            .unwrap_or_else(|e| panic!("Invalid JOB_TIMEOUT_RESPONSE: {e}"));

        let max_payload_bytes: usize = std::env::var("JOB_MAX_PAYLOAD_BYTES")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("JOB_MAX_PAYLOAD_BYTES must be a valid usize");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            job_timeout_secs,
            timeout_response,
            max_payload_bytes,
            shutdown_timeout_secs,
        }
    }

    /// The configured handler timeout, `None` when unbounded.
    pub fn job_timeout(&self) -> Option<Duration> {
        (self.job_timeout_secs > 0).then(|| Duration::from_secs(self.job_timeout_secs))
    }

    /// The trigger payload limit, `None` when unlimited.
    pub fn max_payload_bytes(&self) -> Option<usize> {
        (self.max_payload_bytes > 0).then_some(self.max_payload_bytes)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            job_timeout_secs: 0,
            timeout_response: TimeoutResponse::Abort,
            max_payload_bytes: 0,
            shutdown_timeout_secs: 30,
        }
    }
}

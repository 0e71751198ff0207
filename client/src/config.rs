//! Configuration management for the client.

use std::env;
use std::time::Duration;
use stockroom_engine::UpdateFailurePolicy;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog API, without the `/api` suffix
    pub api_base_url: String,
    /// Timeout applied to every remote request
    pub request_timeout: Duration,
    /// What to do with an optimistic update the remote rejects
    pub update_policy: UpdateFailurePolicy,
}

impl Config {
    /// Create a configuration with defaults for everything but the base URL.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            update_policy: UpdateFailurePolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = env::var("API_BASE_URL").map_err(|_| ConfigError::MissingApiBaseUrl)?;

        let timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let update_policy = match env::var("UPDATE_ROLLBACK").as_deref() {
            Err(_) | Ok("keep") => UpdateFailurePolicy::KeepOptimistic,
            Ok("restore") => UpdateFailurePolicy::RestorePrevious,
            Ok(other) => return Err(ConfigError::InvalidRollbackPolicy(other.to_string())),
        };

        Ok(Self {
            request_timeout: Duration::from_secs(timeout_secs),
            update_policy,
            ..Self::new(api_base_url)
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_BASE_URL environment variable is required")]
    MissingApiBaseUrl,

    #[error("Invalid REQUEST_TIMEOUT_SECS value")]
    InvalidTimeout,

    #[error("Invalid UPDATE_ROLLBACK value '{0}', expected 'keep' or 'restore'")]
    InvalidRollbackPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let config = Config::new("http://localhost:8080/");
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.update_policy, UpdateFailurePolicy::KeepOptimistic);
    }
}

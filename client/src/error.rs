//! Unified error handling for the client.

use crate::config::ConfigError;
use reqwest::StatusCode;
use stockroom_engine::{Error, RecordId};

/// Application error type for the startup path and the binary.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid usage: {0}")]
    Usage(String),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Map a failed HTTP exchange onto the engine's remote error kinds.
///
/// `target` is the record the request addressed, if any.
pub(crate) fn from_status(status: StatusCode, target: Option<RecordId>, body: &str) -> Error {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };

    match status {
        StatusCode::NOT_FOUND => match target {
            Some(id) => Error::NotFound(id),
            None => Error::Transport(detail),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(detail),
        _ => Error::Transport(detail),
    }
}

/// Map a transport-level failure (connect, timeout, decode) onto the engine.
pub(crate) fn from_reqwest(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

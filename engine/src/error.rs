//! Error types for the Stockroom engine.

use crate::{MutationId, PageToken, RecordId};
use thiserror::Error;

/// All possible errors from the Stockroom engine.
///
/// Remote failures reported by a gateway are expressed with the first three
/// variants so the engine can decide how to reconcile local state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Remote errors
    #[error("transport error: {0}")]
    Transport(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("record not found: {0}")]
    NotFound(RecordId),

    // Draft validation errors
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    // State errors
    #[error("unknown mutation: {0}")]
    UnknownMutation(MutationId),

    #[error("no page fetch in flight")]
    NoFetchInFlight,

    #[error("page token mismatch: expected {expected}, got {got}")]
    PageTokenMismatch { expected: PageToken, got: PageToken },
}

impl Error {
    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Whether this error means the target no longer exists remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

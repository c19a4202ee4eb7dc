//! The [`KanaError`] taxonomy.
//!
//! Every fallible operation in the core crates returns this error (or a
//! store-level error that projects into it). Errors cross the HTTP boundary
//! as a uniform success/failure envelope keyed by [`KanaError::code`] —
//! callers branch on the reason string, never on a panic.

use thiserror::Error;

/// Convenience result alias used across the kana crates.
pub type Result<T> = std::result::Result<T, KanaError>;

/// Error taxonomy for quiz operations.
#[derive(Debug, Error)]
pub enum KanaError {
    /// No identity could be resolved for the request.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A module, session, or character is absent — or not owned by the caller.
    /// Ownership failures deliberately collapse into not-found so ids cannot
    /// be probed across users.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is valid in general but not in the session's current
    /// state (already completed, duplicate answer, answers already submitted).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The target module has no characters to quiz on.
    #[error("module has no content")]
    EmptyContent,

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invariant violation or unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KanaError {
    /// Wire reason code for the HTTP envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "notAuthenticated",
            Self::NotFound(_) => "notFound",
            Self::InvalidState(_) => "invalidState",
            Self::EmptyContent => "emptyContent",
            Self::Storage(_) | Self::Internal(_) => "internal",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

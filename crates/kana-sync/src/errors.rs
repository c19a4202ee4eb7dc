//! Sync delivery errors.

use thiserror::Error;

/// Why a delivery attempt did not land.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The store or network was unavailable; the attempt will be retried.
    #[error("delivery unavailable: {0}")]
    Unavailable(String),

    /// The server rejected the answer (duplicate, completed session,
    /// unknown character). Retrying cannot succeed, so the queue fails
    /// the entry immediately.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

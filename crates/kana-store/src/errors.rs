//! Store-level errors and their projection onto the core taxonomy.

use kana_core::KanaError;
use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying `SQLite` failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Entity absent or not owned by the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation invalid in the session's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The target module has no characters.
    #[error("module has no content")]
    EmptyContent,

    /// Lock poisoning or other internal invariant failure.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl From<KanaError> for StoreError {
    fn from(err: KanaError) -> Self {
        match err {
            KanaError::NotFound(what) => Self::NotFound(what),
            KanaError::InvalidState(why) => Self::InvalidState(why),
            KanaError::EmptyContent => Self::EmptyContent,
            KanaError::Storage(msg) | KanaError::Internal(msg) => Self::Internal(msg),
            KanaError::NotAuthenticated => Self::Internal("unauthenticated call reached store".into()),
        }
    }
}

impl From<StoreError> for KanaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::InvalidState(why) => Self::InvalidState(why),
            StoreError::EmptyContent => Self::EmptyContent,
            StoreError::Sqlite(e) => Self::Storage(e.to_string()),
            StoreError::Pool(e) => Self::Storage(e.to_string()),
            StoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn projects_onto_core_taxonomy() {
        let kana: KanaError = StoreError::NotFound("session".into()).into();
        assert_matches!(kana, KanaError::NotFound(_));

        let kana: KanaError = StoreError::InvalidState("done".into()).into();
        assert_matches!(kana, KanaError::InvalidState(_));

        let kana: KanaError = StoreError::EmptyContent.into();
        assert_matches!(kana, KanaError::EmptyContent);
    }

    #[test]
    fn round_trips_engine_errors() {
        let store: StoreError = KanaError::EmptyContent.into();
        assert_matches!(store, StoreError::EmptyContent);
    }
}

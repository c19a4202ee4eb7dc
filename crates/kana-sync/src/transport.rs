//! The delivery seam between the queue and the store.

use std::sync::Arc;

use async_trait::async_trait;

use kana_store::{QuizStore, StoreError};

use crate::errors::SyncError;
use crate::queue::QueuedAnswer;

/// Delivers one queued answer to wherever answers live.
///
/// Production uses [`StoreTransport`]; tests script their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt to deliver one answer for the given session.
    async fn deliver(&self, session_id: &str, answer: &QueuedAnswer) -> Result<(), SyncError>;
}

/// Transport that submits answers straight into the local [`QuizStore`].
pub struct StoreTransport {
    store: Arc<QuizStore>,
    user_id: String,
}

impl StoreTransport {
    /// Deliver on behalf of one learner.
    pub fn new(store: Arc<QuizStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl Transport for StoreTransport {
    async fn deliver(&self, session_id: &str, answer: &QueuedAnswer) -> Result<(), SyncError> {
        match self.store.submit_answer(
            &self.user_id,
            session_id,
            &answer.character_id,
            &answer.answer_text,
            answer.latency_ms,
        ) {
            Ok(_) => Ok(()),
            // The store will never accept these, no matter how often we retry.
            Err(e @ (StoreError::InvalidState(_) | StoreError::NotFound(_))) => {
                Err(SyncError::Rejected(e.to_string()))
            }
            Err(e) => Err(SyncError::Unavailable(e.to_string())),
        }
    }
}

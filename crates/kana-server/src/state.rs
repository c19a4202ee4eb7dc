//! Shared state passed to axum handlers.

use std::sync::Arc;

use kana_store::QuizStore;

use crate::identity::IdentityProvider;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The backing store.
    pub store: Arc<QuizStore>,
    /// Token-to-learner resolution.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Bundle a store with an identity provider.
    pub fn new(store: Arc<QuizStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }
}

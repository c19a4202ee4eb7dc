//! Bearer-token identity.
//!
//! The [`IdentityProvider`] seam keeps token resolution pluggable; the
//! built-in [`StaticTokenProvider`] maps configured tokens to learner
//! ids. Handlers take an [`Identity`] argument and the extractor rejects
//! unauthenticated requests before the handler body runs.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use kana_core::KanaError;

use crate::envelope::ApiError;
use crate::state::AppState;

/// Resolves a bearer token to a learner id.
pub trait IdentityProvider: Send + Sync {
    /// The learner the token belongs to, if any.
    fn resolve(&self, token: &str) -> Option<String>;
}

/// Fixed token table, for single-host deployments and tests.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, String>,
}

impl StaticTokenProvider {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with one token for one learner.
    pub fn single(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let mut provider = Self::new();
        provider.insert(token, user_id);
        provider
    }

    /// Register a token.
    pub fn insert(&mut self, token: impl Into<String>, user_id: impl Into<String>) {
        let _ = self.tokens.insert(token.into(), user_id.into());
    }
}

impl IdentityProvider for StaticTokenProvider {
    fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

/// The authenticated learner id, extracted from `Authorization: Bearer`.
#[derive(Clone, Debug)]
pub struct Identity(pub String);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError(KanaError::NotAuthenticated))?;
        state
            .identity
            .resolve(token)
            .map(Identity)
            .ok_or(ApiError(KanaError::NotAuthenticated))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_resolves_known_token() {
        let provider = StaticTokenProvider::single("tok", "user_1");
        assert_eq!(provider.resolve("tok").as_deref(), Some("user_1"));
        assert!(provider.resolve("other").is_none());
    }
}

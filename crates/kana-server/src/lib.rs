//! HTTP surface of the quiz service.
//!
//! Thin axum layer over [`kana_store::QuizStore`]: handlers translate the
//! wire shapes, the store owns every rule. All routes live under `/api`
//! and speak the `{"success":…}` envelope.

pub mod envelope;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod state;

pub use identity::{Identity, IdentityProvider, StaticTokenProvider};
pub use router::{build_router, serve};
pub use state::AppState;

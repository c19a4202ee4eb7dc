//! Module and stats routes.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::envelope::{ApiError, ok};
use crate::identity::Identity;
use crate::state::AppState;

/// Query of `GET /api/stats/weak-characters`.
#[derive(Debug, Deserialize)]
pub struct WeakQuery {
    /// Maximum characters to return.
    #[serde(default = "default_weak_limit")]
    pub limit: i64,
}

fn default_weak_limit() -> i64 {
    10
}

/// `GET /api/modules`
pub async fn list_modules(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Response, ApiError> {
    let modules = state.store.list_modules(&user_id)?;
    Ok(ok(modules))
}

/// `GET /api/stats/modules/{moduleId}`
pub async fn get_module_stats(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(module_id): Path<String>,
) -> Result<Response, ApiError> {
    let stats = state.store.get_module_stats(&user_id, &module_id)?;
    Ok(ok(stats))
}

/// `GET /api/stats/overall`
pub async fn get_overall_stats(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Response, ApiError> {
    let stats = state.store.get_overall_stats(&user_id)?;
    Ok(ok(stats))
}

/// `GET /api/stats/weak-characters`
pub async fn get_weak_characters(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(query): Query<WeakQuery>,
) -> Result<Response, ApiError> {
    let weak = state.store.get_weak_characters(&user_id, query.limit)?;
    Ok(ok(weak))
}

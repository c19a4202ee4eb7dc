//! Router assembly and the serve loop.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{delete, get, post};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::envelope::ok;
use crate::handlers::{quiz, stats};
use crate::state::AppState;

/// Build the axum router with all `/api` routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/modules", get(stats::list_modules))
        .route("/api/quiz/start", post(quiz::start_quiz))
        .route("/api/quiz/history", get(quiz::get_quiz_history))
        .route("/api/quiz/{session_id}/answer", post(quiz::submit_answer))
        .route(
            "/api/quiz/{session_id}/answers",
            post(quiz::submit_answer_batch),
        )
        .route(
            "/api/quiz/{session_id}/complete",
            post(quiz::complete_quiz),
        )
        .route("/api/quiz/{session_id}", delete(quiz::abandon_quiz))
        .route(
            "/api/quiz/{session_id}/result",
            get(quiz::get_quiz_result),
        )
        .route(
            "/api/stats/modules/{module_id}",
            get(stats::get_module_stats),
        )
        .route("/api/stats/overall", get(stats::get_overall_stats))
        .route(
            "/api/stats/weak-characters",
            get(stats::get_weak_characters),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Unauthenticated liveness probe.
async fn health() -> axum::response::Response {
    ok(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

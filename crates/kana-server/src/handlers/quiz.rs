//! Quiz lifecycle routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use kana_store::types::{BatchAnswer, QuizOptions};

use crate::envelope::{ApiError, ok};
use crate::identity::Identity;
use crate::state::AppState;

/// Body of `POST /api/quiz/start`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    /// Module to quiz on.
    pub module_id: String,
    /// Question count override.
    #[serde(default)]
    pub question_count: Option<usize>,
    /// Options-per-question override.
    #[serde(default)]
    pub options_count: Option<usize>,
}

/// Body of `POST /api/quiz/{sessionId}/answer`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    /// Answered character.
    pub character_id: String,
    /// Submitted text.
    pub answer_text: String,
    /// Response latency in milliseconds.
    #[serde(default)]
    pub latency_ms: i64,
}

/// Body of `POST /api/quiz/{sessionId}/answers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// The whole quiz's answers.
    pub answers: Vec<BatchAnswer>,
}

/// Query of `GET /api/quiz/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum entries to return.
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

/// `POST /api/quiz/start`
pub async fn start_quiz(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(req): Json<StartQuizRequest>,
) -> Result<Response, ApiError> {
    let quiz = state.store.start_quiz(
        &user_id,
        &req.module_id,
        QuizOptions {
            question_count: req.question_count,
            options_count: req.options_count,
        },
    )?;
    Ok(ok(quiz))
}

/// `POST /api/quiz/{sessionId}/answer`
pub async fn submit_answer(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(session_id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Response, ApiError> {
    let outcome = state.store.submit_answer(
        &user_id,
        &session_id,
        &req.character_id,
        &req.answer_text,
        req.latency_ms,
    )?;
    Ok(ok(outcome))
}

/// `POST /api/quiz/{sessionId}/answers`
pub async fn submit_answer_batch(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(session_id): Path<String>,
    Json(req): Json<BatchRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .store
        .submit_answer_batch(&user_id, &session_id, &req.answers)?;
    Ok(ok(outcome))
}

/// `POST /api/quiz/{sessionId}/complete`
pub async fn complete_quiz(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state.store.complete_quiz(&user_id, &session_id)?;
    Ok(ok(result))
}

/// `DELETE /api/quiz/{sessionId}`
pub async fn abandon_quiz(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    state.store.abandon_quiz(&user_id, &session_id)?;
    Ok(ok(serde_json::json!({ "abandoned": true })))
}

/// `GET /api/quiz/{sessionId}/result`
pub async fn get_quiz_result(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state.store.get_quiz_result(&user_id, &session_id)?;
    Ok(ok(result))
}

/// `GET /api/quiz/history`
pub async fn get_quiz_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let history = state.store.get_quiz_history(&user_id, query.limit)?;
    Ok(ok(history))
}

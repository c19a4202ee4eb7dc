//! The response envelope.
//!
//! Every route answers `{"success":true,"data":…}` or
//! `{"success":false,"error":"<reason>","message":…}`, with the HTTP
//! status mirroring the reason code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use kana_core::KanaError;
use kana_store::StoreError;

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// A handler failure, carried as the domain error it projects.
#[derive(Debug)]
pub struct ApiError(pub KanaError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            KanaError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            KanaError::NotFound(_) => StatusCode::NOT_FOUND,
            KanaError::InvalidState(_) => StatusCode::CONFLICT,
            KanaError::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
            KanaError::Storage(_) | KanaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = json!({
            "success": false,
            "error": self.0.code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<KanaError> for ApiError {
    fn from(err: KanaError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! services/api/src/web/failure.rs
//!
//! The error body every endpoint returns on failure:
//! `{"error": {"code", "message", "details"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    /// Always an object: the offending parameter, the requested version, or
    /// the first failing schema path.
    #[schema(value_type = Object)]
    pub details: Value,
}

/// A request that could not be served. Rendered as [`ErrorBody`].
#[derive(Debug)]
pub struct ServiceFailure {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

impl ServiceFailure {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        let details = if details.is_object() { details } else { json!({}) };
        Self {
            status,
            code,
            message: message.into(),
            details,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message, details)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message, details)
    }

    pub fn internal(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message, details)
    }
}

impl IntoResponse for ServiceFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorPayload {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

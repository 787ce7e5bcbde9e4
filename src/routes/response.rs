//! JSON envelope for the fetch-driven endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::services::validation::FieldErrors;

pub const CODE_OK: i32 = 1;
pub const CODE_FAIL: i32 = -1;

/// `{ code, msg, data }` where `code` is 1 on success and -1 on failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(msg: &str, data: Option<T>) -> Self {
        Self { code: CODE_OK, msg: msg.to_owned(), data }
    }
}

/// Failure reported as an [`ApiResponse`] with a matching HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub msg: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self { status, msg: msg.into() }
    }

    #[must_use]
    pub fn validation(errors: &FieldErrors) -> Self {
        Self::new(StatusCode::BAD_REQUEST, errors.to_string())
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> { code: CODE_FAIL, msg: self.msg, data: None };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;

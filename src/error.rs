//! API Errors
//! Mission: One error taxonomy for every route, mapped to HTTP in one place

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;

/// Errors surfaced by services and middleware
#[derive(Debug)]
pub enum ApiError {
    /// Duplicate identity or password policy violation
    Validation(String),
    /// Login against an email nobody registered
    UserNotFound,
    /// Login with the wrong password
    InvalidCredentials,
    /// Missing, malformed, expired, forged or revoked bearer token
    Unauthorized(&'static str),
    /// Caller is authenticated but does not own the resource
    Forbidden(String),
    NotFound(String),
    TooManyRequests { retry_after: Duration },
    /// Persistence failure, reported with the underlying message
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UserNotFound | ApiError::Store(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::UserNotFound => "user_not_found",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::TooManyRequests { .. } => "rate_limit_exceeded",
            ApiError::Store(_) => "store_error",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::UserNotFound => write!(f, "User not found"),
            ApiError::InvalidCredentials => write!(f, "Please check your password"),
            ApiError::Unauthorized(reason) => write!(f, "{}", reason),
            ApiError::Forbidden(msg) => write!(f, "{}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::TooManyRequests { .. } => write!(f, "Too many requests. Please slow down."),
            ApiError::Store(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain in the message
        ApiError::Store(format!("{:#}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });

        if let ApiError::TooManyRequests { retry_after } = &self {
            let secs = retry_after.as_secs().max(1);
            body["retry_after_seconds"] = json!(secs);
            return (
                status,
                [(header::RETRY_AFTER, secs.to_string())],
                Json(body),
            )
                .into_response();
        }

        (status, Json(body)).into_response()
    }
}

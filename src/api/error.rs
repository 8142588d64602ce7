use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::CheckError;

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    RateLimited { retry_after_seconds: u64 },

    QuotaExceeded { reason: String },

    NotFound(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::RateLimited {
                retry_after_seconds,
            } => write!(f, "Rate limited, retry after {}s", retry_after_seconds),
            ApiError::QuotaExceeded { reason } => write!(f, "Quota exceeded: {}", reason),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::RateLimited {
                retry_after_seconds,
            } => {
                let body = json!({
                    "error": "Rate limit exceeded. Please try again in a minute.",
                    "retryAfter": retry_after_seconds,
                });
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                let headers = response.headers_mut();
                if let Ok(value) = retry_after_seconds.to_string().parse() {
                    headers.insert("Retry-After", value);
                }
                headers.insert("X-RateLimit-Remaining", "0".parse().expect("static header"));
                response
            }
            ApiError::QuotaExceeded { reason } => {
                let body = json!({
                    "error": reason,
                    "searchesRemaining": 0,
                    "upgradeRequired": true,
                });
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                let body = json!({ "error": "A database error occurred" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                let body = json!({
                    "error": "Internal server error",
                    "message": "We encountered an issue processing your request. Please try again.",
                    "details": msg,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::RateLimited {
                retry_after_seconds,
            } => ApiError::RateLimited {
                retry_after_seconds,
            },
            CheckError::QuotaExceeded { reason } => ApiError::QuotaExceeded { reason },
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

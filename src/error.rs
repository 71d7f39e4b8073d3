//! Error types for the cache layer and its HTTP surface
//!
//! The cache store itself has no error type: every store operation is total.
//! What remains is the rate-limit rejection returned by the middleware,
//! source-of-truth failures, and the API error handlers return.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Rate Limit Error ==
/// A request exceeded its policy's quota within the current window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RateLimitError {
    /// The violated policy's configured message
    pub message: String,
    /// Seconds until the current window elapses (at least 1)
    pub retry_after_secs: u64,
    /// Quota of the violated policy
    pub limit: u32,
}

impl RateLimitError {
    /// HTTP status carried by every rate-limit rejection.
    pub fn status(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.message,
        }));

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_secs));
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        response
    }
}

// == Repository Error ==
/// Failure reported by the source of truth.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Source of truth unavailable: {0}")]
    Unavailable(String),
}

// == API Error ==
/// Unified error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Write collides with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Source of truth could not serve the request
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::Unavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_error_response() {
        let err = RateLimitError {
            message: "Too many requests".to_string(),
            retry_after_secs: 12,
            limit: 5,
        };
        assert_eq!(err.to_string(), "Too many requests");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    }

    #[test]
    fn test_repository_error_mapping() {
        let status = |err: RepositoryError| ApiError::from(err).into_response().status();

        assert_eq!(status(RepositoryError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(RepositoryError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status(RepositoryError::Unavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

//! # Benchmark Errors
//!
//! Every failure a benchmark request can produce, and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::normalizer::NormalizeError;

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Benchmark errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// Required request parameter missing or empty. No query was attempted.
    #[error("{0}")]
    Validation(String),

    /// Pool checkout, transaction, directive, prepare or execute failed
    #[error("{0}")]
    Query(String),

    /// A returned row could not be normalized
    #[error("Invalid result row: {0}")]
    Integrity(String),
}

impl BenchError {
    /// `Missing "<param>" parameter`
    pub fn missing_param(param: &str) -> Self {
        BenchError::Validation(format!("Missing \"{}\" parameter", param))
    }

    /// `Missing parameters`, for requests that need several values
    pub fn missing_params() -> Self {
        BenchError::Validation("Missing parameters".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BenchError::Validation(_) => StatusCode::BAD_REQUEST,
            BenchError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BenchError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<tokio_postgres::Error> for BenchError {
    fn from(err: tokio_postgres::Error) -> Self {
        BenchError::Query(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for BenchError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        BenchError::Query(err.to_string())
    }
}

impl From<NormalizeError> for BenchError {
    fn from(err: NormalizeError) -> Self {
        BenchError::Integrity(err.to_string())
    }
}

/// Error response body. A single `error` field, nothing internal.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for BenchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

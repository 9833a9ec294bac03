//! Error types: chain validation failures, HTTP-facing errors, configuration errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Why a candidate block may not extend the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Candidate's prev_hash does not name the predecessor.
    #[error("block {position}: prev_hash {found} does not match predecessor hash {expected}")]
    Linkage {
        position: u64,
        expected: String,
        found: String,
    },

    /// Stored hash differs from a recomputation over the block's fields.
    #[error("block {position}: stored hash {stored} does not match recomputed {recomputed}")]
    Integrity {
        position: u64,
        stored: String,
        recomputed: String,
    },

    /// Candidate position is not predecessor position + 1.
    #[error("block {found}: expected position {expected}")]
    Contiguity { expected: u64, found: u64 },

    /// Proposed root is not a well-formed genesis block.
    #[error("invalid genesis: {}", .0.join("; "))]
    Genesis(Vec<String>),
}

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Invalid value in the process environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

//! Unified Error Handling
//!
//! Application-wide error type and the HTTP error payload.
//!
//! The query surface defines exactly two responses: a 200 result payload or
//! a 500 error payload carrying `{"message": "<reason>"}`. Rejection reason
//! texts pass through unaltered; only database/internal details are logged
//! server-side.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::orders::OrderRejection;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Domain Errors ==========
    /// A submission or query parameter failed a domain rule. The inner
    /// rejection carries the exact reason string callers see.
    #[error("{0}")]
    Rejected(#[from] OrderRejection),

    // ========== Transport Errors ==========
    #[error("Client disconnected")]
    ClientDisconnected,

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error payload: `{"message": "<reason>"}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
            }
            _ => {}
        }

        let body = Json(ErrorResponse {
            message: self.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

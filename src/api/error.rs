//! # API Error Types
//!
//! Maps [`crate::errors::Error`] onto HTTP status codes and a JSON body of the
//! form `{"error": {"code": "...", "message": "..."}}`. Messages of 500-class
//! errors are logged and replaced with a generic text.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INSUFFICIENT_STOCK").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Error type returned by every handler.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Input broke a business rule (400).
    #[error("{0}")]
    Validation(String),

    /// Body or query could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    /// Not enough stock for the order (400).
    #[error("{0}")]
    InsufficientStock(String),

    /// Subsidy switched off or past its deadline (400).
    #[error("{0}")]
    SubsidyUnavailable(String),

    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Role or ownership check failed (403).
    #[error("{0}")]
    Forbidden(String),

    /// Conflicts with current state (409).
    #[error("{0}")]
    Conflict(String),

    /// Upload exceeds the size limit (413).
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::InsufficientStock(_) => (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"),
            Self::SubsidyUnavailable(_) => (StatusCode::BAD_REQUEST, "SUBSIDY_UNAVAILABLE"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::NotFound { .. } => Self::NotFound(message),
            Error::Validation { message } => Self::Validation(message),
            Error::InvalidAmount { .. } => Self::Validation(message),
            Error::InsufficientStock { .. } => Self::InsufficientStock(message),
            Error::SubsidyInactive { .. } | Error::SubsidyClosed { .. } => {
                Self::SubsidyUnavailable(message)
            }
            Error::Unauthorized { message } => Self::Unauthorized(message),
            Error::Forbidden { message } => Self::Forbidden(message),
            Error::Conflict { message } => Self::Conflict(message),
            Error::InvalidTransition { .. } => Self::Conflict(message),
            Error::Config { .. }
            | Error::Database(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Crypto { .. } => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases = [
            (Error::not_found("crop", 7), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                Error::InsufficientStock {
                    available: 1.0,
                    requested: 2.0,
                },
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_STOCK",
            ),
            (
                Error::SubsidyInactive { id: 3 },
                StatusCode::BAD_REQUEST,
                "SUBSIDY_UNAVAILABLE",
            ),
            (
                Error::InvalidTransition {
                    entity: "order",
                    from: "SHIPPED".to_string(),
                    to: "CANCELLED".to_string(),
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (Error::forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (
                Error::Database(sea_orm::DbErr::Custom("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(ApiError::from(err).status_and_code(), (status, code));
        }
    }

    #[test]
    fn test_domain_message_is_kept() {
        let api = ApiError::from(Error::validation("Rating must be between 1 and 5"));
        assert_eq!(api.to_string(), "Rating must be between 1 and 5");
    }
}

//! Unified error type for `AgroTrust`.
//!
//! Core operations return [`Error`]; the HTTP layer translates each variant into
//! a status code in [`crate::api::error`].

use thiserror::Error;

/// Everything that can go wrong below the HTTP layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup or configuration problem (missing secret, unreadable seed file, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Request data failed a business rule
    #[error("Validation error: {message}")]
    Validation {
        /// Which rule failed
        message: String,
    },

    /// Price, quantity or amount that is zero, negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// Referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"crop"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Order quantity exceeds what the crop has left
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Quantity currently available
        available: f64,
        /// Quantity the buyer asked for
        requested: f64,
    },

    /// Subsidy exists but has been switched off
    #[error("Subsidy {id} is not active")]
    SubsidyInactive {
        /// Subsidy id
        id: i64,
    },

    /// Subsidy deadline is in the past
    #[error("Subsidy {id} closed at {deadline}")]
    SubsidyClosed {
        /// Subsidy id
        id: i64,
        /// The deadline that has passed
        deadline: chrono::DateTime<chrono::Utc>,
    },

    /// Record state does not allow the requested change
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// Status change not allowed from the current status
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        /// Entity kind
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Credentials missing, wrong, or expired
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Reason
        message: String,
    },

    /// Authenticated but not allowed
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason
        message: String,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (uploads, seed file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal value that could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password hashing or token signing failure
    #[error("Crypto error: {message}")]
    Crypto {
        /// Underlying library message
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the Tollgate authorization engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TollgateError {
    /// No external identity accompanied the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The external identity is valid but has no local user record.
    #[error("User not found")]
    UserNotFound,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TollgateError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Whether the error originates from the store rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

pub type TollgateResult<T> = Result<T, TollgateError>;

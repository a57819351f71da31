//! Property domain errors
//!
//! Every use case returns [`PropertyError`]. The HTTP layer maps each
//! variant to a status code, so the variants follow what a caller can do
//! about the failure rather than where it came from.

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

/// Errors that can occur in the property domain
#[derive(Debug, Error)]
pub enum PropertyError {
    /// The requested owner, property or image does not exist
    #[error("{entity} with ID {id} was not found")]
    NotFound { entity: String, id: String },

    /// A unique value is already taken
    #[error("{0}")]
    AlreadyExists(String),

    /// The request is well-formed but cannot be carried out
    #[error("{0}")]
    InvalidOperation(String),

    /// One or more input rules failed
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An unexpected fault while talking to storage
    #[error("{message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<PortError>,
    },
}

impl PropertyError {
    /// Creates a NotFound error for the given entity
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        PropertyError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error with a single message
    pub fn validation(message: impl Into<String>) -> Self {
        PropertyError::Validation(vec![message.into()])
    }

    /// Creates an InvalidOperation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        PropertyError::InvalidOperation(message.into())
    }

    /// Creates an OperationFailed error without a storage cause
    pub fn operation_failed(message: impl Into<String>) -> Self {
        PropertyError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps anything that is not already a domain outcome under a new message
    ///
    /// Not-found, duplicate, invalid and validation errors pass through
    /// unchanged.
    pub fn wrap_unexpected(self, message: &str) -> Self {
        match self {
            PropertyError::OperationFailed { source, .. } => PropertyError::OperationFailed {
                message: message.to_string(),
                source,
            },
            other => other,
        }
    }

    /// Returns true when re-running the unit of work may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PropertyError::OperationFailed { source: Some(source), .. } if source.is_transient()
        )
    }

    /// Returns true for missing entities
    pub fn is_not_found(&self) -> bool {
        matches!(self, PropertyError::NotFound { .. })
    }

    /// Individual messages for the response `errors` list
    pub fn messages(&self) -> Vec<String> {
        match self {
            PropertyError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<PortError> for PropertyError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => PropertyError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Conflict { message } => PropertyError::AlreadyExists(message),
            PortError::Validation { message, .. } => PropertyError::Validation(vec![message]),
            other => PropertyError::OperationFailed {
                message: format!("Storage operation failed: {}", other),
                source: Some(other),
            },
        }
    }
}

impl From<MoneyError> for PropertyError {
    fn from(err: MoneyError) -> Self {
        PropertyError::Validation(vec![err.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_already_exists() {
        let err: PropertyError = PortError::conflict("code taken").into();
        assert!(matches!(err, PropertyError::AlreadyExists(ref m) if m == "code taken"));
    }

    #[test]
    fn test_connection_failures_are_transient() {
        let err: PropertyError = PortError::connection("reset").into();
        assert!(err.is_transient());

        let err: PropertyError = PortError::internal("boom").into();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_wrap_unexpected_keeps_domain_outcomes() {
        let err = PropertyError::not_found("Property", 7).wrap_unexpected("wrapped");
        assert!(err.is_not_found());

        let err = PropertyError::from(PortError::internal("boom")).wrap_unexpected("wrapped");
        assert_eq!(err.to_string(), "wrapped");
        assert!(std::error::Error::source(&err).is_some());
    }
}

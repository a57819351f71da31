//! Identity errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors raised by the authentication use cases
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<PortError>,
    },
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation(vec![message.into()])
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AuthError::Unauthorized(message.into())
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        AuthError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Messages suitable for a response body
    pub fn messages(&self) -> Vec<String> {
        match self {
            AuthError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<PortError> for AuthError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Conflict { message } => AuthError::Validation(vec![message]),
            other => AuthError::OperationFailed {
                message: format!("Identity store operation failed: {}", other),
                source: Some(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_validation() {
        let err = AuthError::from(PortError::conflict("Username is already taken"));
        assert_eq!(err.messages(), vec!["Username is already taken".to_string()]);
    }

    #[test]
    fn test_connection_error_is_operation_failure() {
        let err = AuthError::from(PortError::connection("reset"));
        assert!(matches!(err, AuthError::OperationFailed { source: Some(_), .. }));
    }
}

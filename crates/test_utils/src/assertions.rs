//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain errors and prices that
//! give more meaningful failure messages than standard assertions.

use domain_identity::AuthError;
use domain_property::PropertyError;
use rust_decimal::Decimal;

/// Asserts that two decimals are equal after normalizing their scale
///
/// `200000` and `200000.00` compare equal.
pub fn assert_decimal_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Decimal mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that the error is a validation failure carrying `message`
pub fn assert_validation_message(error: &PropertyError, message: &str) {
    match error {
        PropertyError::Validation(messages) => assert!(
            messages.iter().any(|m| m == message),
            "Expected validation message {:?}, got {:?}",
            message,
            messages
        ),
        other => panic!("Expected validation error {:?}, got {:?}", message, other),
    }
}

/// Asserts that the error reports a missing entity
pub fn assert_not_found(error: &PropertyError) {
    assert!(error.is_not_found(), "Expected not found, got {:?}", error);
}

/// Asserts that the error is a conflict with `message`
pub fn assert_already_exists(error: &PropertyError, message: &str) {
    match error {
        PropertyError::AlreadyExists(actual) => assert_eq!(actual, message),
        other => panic!("Expected conflict {:?}, got {:?}", message, other),
    }
}

/// Asserts that authentication failed with `message`
pub fn assert_unauthorized(error: &AuthError, message: &str) {
    match error {
        AuthError::Unauthorized(actual) => assert_eq!(actual, message),
        other => panic!("Expected unauthorized {:?}, got {:?}", message, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_eq_ignores_scale() {
        assert_decimal_eq(dec!(200000.00), dec!(200000));
    }

    #[test]
    fn test_validation_message_found() {
        let error = PropertyError::Validation(vec!["a".to_string(), "Price cannot be negative".to_string()]);
        assert_validation_message(&error, "Price cannot be negative");
    }

    #[test]
    #[should_panic(expected = "Expected validation error")]
    fn test_validation_message_on_other_error() {
        assert_validation_message(&PropertyError::not_found("Owner", 1), "anything");
    }
}

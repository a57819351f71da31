//! Turning input rule failures into [`PropertyError::Validation`]

use validator::{Validate, ValidationErrors};

use crate::error::PropertyError;

/// Flattens validator errors into readable messages, sorted for stable output
pub(crate) fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages
}

/// Runs the derived rules plus any hand-written checks
///
/// Every failing rule is reported, not just the first.
pub(crate) fn check<V: Validate>(input: &V, mut extra: Vec<String>) -> Result<(), PropertyError> {
    let mut all = match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => messages(&errors),
    };
    all.append(&mut extra);

    if all.is_empty() {
        Ok(())
    } else {
        Err(PropertyError::Validation(all))
    }
}

//! Field validation
//!
//! Value objects in every crate reject bad input with a [`FieldError`] that
//! names the offending field, so clients can highlight it.

use std::borrow::Cow;

use crate::error::app_error::AppError;

/// A single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::bad_request(err.message.clone())
            .with_code("VALIDATION_ERROR")
            .with_field(err.field)
    }
}

/// Ensure `value` holds at most `max` characters
pub fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Ensure `value` is not blank
pub fn not_blank(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "must not be blank"));
    }
    Ok(())
}

//! Person Name Value Object
//!
//! First and last names on a profile. Optional; empty string means unset.

use kernel::validation::{FieldError, max_chars};

pub const PERSON_NAME_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into().trim().to_string();
        max_chars(field, &value, PERSON_NAME_MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_limit_names_field() {
        assert!(PersonName::new("first_name", "a".repeat(150)).is_ok());
        let err = PersonName::new("last_name", "a".repeat(151)).unwrap_err();
        assert_eq!(err.field, "last_name");
    }

    #[test]
    fn test_empty_is_unset() {
        assert!(PersonName::new("first_name", "  ").unwrap().is_empty());
    }
}

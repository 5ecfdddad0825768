//! Slug Value Object
//!
//! URL-safe key of a category or genre: `[-a-zA-Z0-9_]+`, at most 50 characters.

use std::fmt;

use kernel::validation::{FieldError, max_chars, not_blank};
use serde::{Deserialize, Serialize};

pub const SLUG_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into().trim().to_string();
        not_blank("slug", &value)?;
        max_chars("slug", &value, SLUG_MAX_LENGTH)?;
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(FieldError::new(
                "slug",
                "may contain only letters, digits, '-' and '_'",
            ));
        }
        Ok(Self(value))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

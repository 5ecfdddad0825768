//! Category & Genre
//!
//! Two flat taxonomies with the same shape. Titles reference them by slug.

use derive_more::Display;
use kernel::validation::{max_chars, not_blank};

use crate::domain::value_object::Slug;
use crate::error::{ContentError, ContentResult};

pub const TAXON_NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonKind {
    #[display("category")]
    Category,
    #[display("genre")]
    Genre,
}

impl TaxonKind {
    /// Error for a slug that names nothing, on a path
    pub fn not_found(self) -> ContentError {
        match self {
            TaxonKind::Category => ContentError::CategoryNotFound,
            TaxonKind::Genre => ContentError::GenreNotFound,
        }
    }

    /// Error for a slug that names nothing, inside a title payload
    pub fn unknown(self, slug: impl Into<String>) -> ContentError {
        match self {
            TaxonKind::Category => ContentError::UnknownCategory(slug.into()),
            TaxonKind::Genre => ContentError::UnknownGenre(slug.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub name: String,
    pub slug: Slug,
}

impl Taxon {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> ContentResult<Self> {
        let name = name.into().trim().to_string();
        not_blank("name", &name)?;
        max_chars("name", &name, TAXON_NAME_MAX_LENGTH)?;
        Ok(Self {
            name,
            slug: Slug::new(slug)?,
        })
    }

    /// Case-insensitive substring match on the name
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

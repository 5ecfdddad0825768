//! Title Entity
//!
//! A reviewable work. The rating is derived from its reviews on every read
//! and never written.

use kernel::id::TitleId;
use kernel::validation::{FieldError, max_chars, not_blank};

use crate::domain::entity::taxon::{Taxon, TaxonKind};
use crate::domain::value_object::{ReleaseYear, Slug};
use crate::error::ContentResult;

pub const TITLE_NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub year: ReleaseYear,
    pub description: Option<String>,
    pub category: Option<Taxon>,
    pub genres: Vec<Taxon>,
    /// Mean review score, `None` without reviews
    pub rating: Option<i32>,
}

impl Title {
    pub fn has_genre(&self, slug: &str) -> bool {
        self.genres.iter().any(|g| g.slug.as_str() == slug)
    }
}

/// Raw title fields as supplied by a client
#[derive(Debug, Clone, Default)]
pub struct TitleInput {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Vec<String>,
}

/// Validated title state, ready to be written
///
/// Category and genres are still slugs; the store resolves them and reports
/// the ones that name nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDraft {
    pub name: String,
    pub year: ReleaseYear,
    pub description: Option<String>,
    pub category: Option<Slug>,
    pub genres: Vec<Slug>,
}

impl TitleDraft {
    pub fn new(input: TitleInput) -> ContentResult<Self> {
        Self::build(input, true)
    }

    /// `require_genre` is off for updates that leave the genres alone, so a
    /// title whose last genre was deleted stays editable.
    fn build(input: TitleInput, require_genre: bool) -> ContentResult<Self> {
        let name = input.name.trim().to_string();
        not_blank("name", &name)?;
        max_chars("name", &name, TITLE_NAME_MAX_LENGTH)?;

        let year = ReleaseYear::new(input.year)?;

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let category = input
            .category
            .map(|raw| Slug::new(&raw).map_err(|_| TaxonKind::Category.unknown(raw)))
            .transpose()?;

        let mut genres: Vec<Slug> = Vec::with_capacity(input.genres.len());
        for raw in input.genres {
            let slug = Slug::new(&raw).map_err(|_| TaxonKind::Genre.unknown(raw))?;
            if !genres.contains(&slug) {
                genres.push(slug);
            }
        }
        if require_genre && genres.is_empty() {
            return Err(FieldError::new("genre", "at least one genre is required").into());
        }

        Ok(Self {
            name,
            year,
            description,
            category,
            genres,
        })
    }
}

/// Partial update of a title. `None` leaves the field as is; for the
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub genres: Option<Vec<String>>,
}

impl TitleChanges {
    /// Overlay the changes on `title` and validate the result as a whole
    pub fn apply(self, title: &Title) -> ContentResult<TitleDraft> {
        let current = TitleInput {
            name: title.name.clone(),
            year: title.year.get(),
            description: title.description.clone(),
            category: title.category.as_ref().map(|c| c.slug.to_string()),
            genres: title.genres.iter().map(|g| g.slug.to_string()).collect(),
        };

        let require_genre = self.genres.is_some();
        TitleDraft::build(
            TitleInput {
                name: self.name.unwrap_or(current.name),
                year: self.year.unwrap_or(current.year),
                description: self.description.unwrap_or(current.description),
                category: self.category.unwrap_or(current.category),
                genres: self.genres.unwrap_or(current.genres),
            },
            require_genre,
        )
    }
}

/// Title list filters; every present filter must match
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Genre slug
    pub genre: Option<String>,
    /// Category slug
    pub category: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

impl TitleFilter {
    pub fn matches(&self, title: &Title) -> bool {
        self.genre.as_deref().is_none_or(|g| title.has_genre(g))
            && self.category.as_deref().is_none_or(|c| {
                title
                    .category
                    .as_ref()
                    .is_some_and(|cat| cat.slug.as_str() == c)
            })
            && self.year.is_none_or(|y| title.year.get() == y)
            && self
                .name
                .as_deref()
                .is_none_or(|n| title.name.to_lowercase().contains(&n.to_lowercase()))
    }
}

//! Release Year Value Object
//!
//! A title's year may not lie after the current calendar year. The bound is
//! checked whenever the year is validated, on create and on patch.

use chrono::{Datelike, Utc};

use crate::error::{ContentError, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseYear(i32);

impl ReleaseYear {
    pub fn new(year: i32) -> ContentResult<Self> {
        Self::checked(year, Utc::now().year())
    }

    /// Validate against an explicit current year
    pub fn checked(year: i32, current_year: i32) -> ContentResult<Self> {
        if year > current_year {
            return Err(ContentError::YearInFuture(year));
        }
        Ok(Self(year))
    }

    pub fn from_db(year: i32) -> Self {
        Self(year)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

//! Review score, 1 to 10 inclusive

use crate::error::{ContentError, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(i16);

impl Score {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 10;

    pub fn new(value: i64) -> ContentResult<Self> {
        match i16::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ContentError::ScoreOutOfRange(value)),
        }
    }

    pub fn from_db(value: i16) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

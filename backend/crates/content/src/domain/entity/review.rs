//! Review Entity
//!
//! One author's scored opinion on one title. At most one per (title, author),
//! checked when the review is created and never on update.

use chrono::{DateTime, Utc};
use kernel::id::{ReviewId, TitleId, UserId};
use kernel::validation::{FieldError, not_blank};

use crate::domain::entity::author::Author;
use crate::domain::value_object::Score;
use crate::error::ContentResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub text: String,
    pub score: Score,
    pub author: Option<Author>,
    pub pub_date: DateTime<Utc>,
}

impl Review {
    /// Owner for permission checks; orphaned reviews have none
    pub fn owner(&self) -> Option<UserId> {
        self.author.as_ref().map(|a| a.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub title_id: TitleId,
    pub author: Author,
    pub text: String,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

impl NewReview {
    pub fn new(title_id: TitleId, author: Author, text: String, score: i64) -> ContentResult<Self> {
        Ok(Self {
            title_id,
            author,
            text: body_text(text)?,
            score: Score::new(score)?,
            pub_date: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i64>,
}

impl ReviewChanges {
    /// Validate every present field, then apply them all
    pub fn apply(self, review: &mut Review) -> ContentResult<()> {
        let text = self.text.map(body_text).transpose()?;
        let score = self.score.map(Score::new).transpose()?;

        if let Some(text) = text {
            review.text = text;
        }
        if let Some(score) = score {
            review.score = score;
        }
        Ok(())
    }
}

/// Review and comment bodies: trimmed, not blank
pub(crate) fn body_text(text: String) -> Result<String, FieldError> {
    let text = text.trim().to_string();
    not_blank("text", &text)?;
    Ok(text)
}

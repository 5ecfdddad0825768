//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, UserId};

use crate::domain::entity::author::Author;
use crate::domain::entity::review::body_text;
use crate::error::ContentResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub text: String,
    pub author: Option<Author>,
    pub pub_date: DateTime<Utc>,
}

impl Comment {
    pub fn owner(&self) -> Option<UserId> {
        self.author.as_ref().map(|a| a.user_id)
    }

    pub fn set_text(&mut self, text: String) -> ContentResult<()> {
        self.text = body_text(text)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: ReviewId,
    pub author: Author,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl NewComment {
    pub fn new(review_id: ReviewId, author: Author, text: String) -> ContentResult<Self> {
        Ok(Self {
            review_id,
            author,
            text: body_text(text)?,
            pub_date: Utc::now(),
        })
    }
}

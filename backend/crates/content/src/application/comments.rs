//! Comments Use Case
//!
//! Same ownership rule as reviews. Every operation first resolves the parent
//! review under its title, so a comment is never reached through the wrong path.

use std::sync::Arc;

use auth::policy::{Action, Actor, Resource};
use kernel::id::{CommentId, ReviewId, TitleId};

use crate::application::access::{author_of, require, signed_in};
use crate::domain::entity::{Comment, NewComment};
use crate::domain::repository::{CommentRepository, ReviewRepository, TitleRepository};
use crate::error::{ContentError, ContentResult};

pub struct CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<Vec<Comment>> {
        require(actor, Action::Read, Resource::Content { owner: None })?;
        self.require_review(title_id, review_id).await?;
        self.repo.list_comments(review_id).await
    }

    pub async fn get(
        &self,
        actor: &Actor,
        path: (TitleId, ReviewId, CommentId),
    ) -> ContentResult<Comment> {
        require(actor, Action::Read, Resource::Content { owner: None })?;
        self.find(path).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
        text: String,
    ) -> ContentResult<Comment> {
        require(actor, Action::Create, Resource::Content { owner: None })?;

        let comment = NewComment::new(review_id, author_of(actor)?, text)?;
        self.require_review(title_id, review_id).await?;
        let comment = self.repo.create_comment(&comment).await?;

        tracing::info!(
            review_id = %review_id,
            comment_id = %comment.id,
            user_id = ?comment.owner(),
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        path: (TitleId, ReviewId, CommentId),
        text: Option<String>,
    ) -> ContentResult<Comment> {
        signed_in(actor)?;
        let mut comment = self.find(path).await?;
        require(actor, Action::Update, Resource::Content { owner: comment.owner() })?;

        if let Some(text) = text {
            comment.set_text(text)?;
            self.repo.update_comment(&comment).await?;
            tracing::info!(comment_id = %comment.id, "Comment updated");
        }
        Ok(comment)
    }

    pub async fn delete(
        &self,
        actor: &Actor,
        path: (TitleId, ReviewId, CommentId),
    ) -> ContentResult<()> {
        signed_in(actor)?;
        let comment = self.find(path).await?;
        require(actor, Action::Delete, Resource::Content { owner: comment.owner() })?;

        if !self.repo.delete_comment(comment.id).await? {
            return Err(ContentError::CommentNotFound);
        }

        tracing::info!(comment_id = %comment.id, "Comment deleted");
        Ok(())
    }

    async fn require_review(&self, title_id: TitleId, review_id: ReviewId) -> ContentResult<()> {
        if self.repo.find_title(title_id).await?.is_none() {
            return Err(ContentError::TitleNotFound);
        }
        match self.repo.find_review(title_id, review_id).await? {
            Some(_) => Ok(()),
            None => Err(ContentError::ReviewNotFound),
        }
    }

    async fn find(
        &self,
        (title_id, review_id, comment_id): (TitleId, ReviewId, CommentId),
    ) -> ContentResult<Comment> {
        self.require_review(title_id, review_id).await?;
        self.repo
            .find_comment(review_id, comment_id)
            .await?
            .ok_or(ContentError::CommentNotFound)
    }
}

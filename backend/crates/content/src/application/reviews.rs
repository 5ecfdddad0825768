//! Reviews Use Case
//!
//! Any authenticated caller may review a title once. The author, a moderator
//! or an admin may edit or delete the review afterwards.

use std::sync::Arc;

use auth::policy::{Action, Actor, Resource};
use kernel::id::{ReviewId, TitleId};

use crate::application::access::{author_of, require, signed_in};
use crate::domain::entity::{NewReview, Review, ReviewChanges};
use crate::domain::repository::{ReviewRepository, TitleRepository};
use crate::error::{ContentError, ContentResult};

pub struct ReviewInput {
    pub text: String,
    pub score: i64,
}

pub struct ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    repo: Arc<R>,
}

impl<R> ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, actor: &Actor, title_id: TitleId) -> ContentResult<Vec<Review>> {
        require(actor, Action::Read, Resource::Content { owner: None })?;
        self.require_title(title_id).await?;
        self.repo.list_reviews(title_id).await
    }

    pub async fn get(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<Review> {
        require(actor, Action::Read, Resource::Content { owner: None })?;
        self.find(title_id, review_id).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        title_id: TitleId,
        input: ReviewInput,
    ) -> ContentResult<Review> {
        require(actor, Action::Create, Resource::Content { owner: None })?;

        let review = NewReview::new(title_id, author_of(actor)?, input.text, input.score)?;
        self.require_title(title_id).await?;
        let review = self.repo.create_review(&review).await?;

        tracing::info!(
            title_id = %title_id,
            review_id = %review.id,
            user_id = ?review.owner(),
            score = review.score.get(),
            "Review created"
        );
        Ok(review)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> ContentResult<Review> {
        signed_in(actor)?;
        let mut review = self.find(title_id, review_id).await?;
        require(actor, Action::Update, Resource::Content { owner: review.owner() })?;

        changes.apply(&mut review)?;
        self.repo.update_review(&review).await?;

        tracing::info!(title_id = %title_id, review_id = %review_id, "Review updated");
        Ok(review)
    }

    pub async fn delete(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<()> {
        signed_in(actor)?;
        let review = self.find(title_id, review_id).await?;
        require(actor, Action::Delete, Resource::Content { owner: review.owner() })?;

        if !self.repo.delete_review(review_id).await? {
            return Err(ContentError::ReviewNotFound);
        }

        tracing::info!(title_id = %title_id, review_id = %review_id, "Review deleted");
        Ok(())
    }

    async fn require_title(&self, title_id: TitleId) -> ContentResult<()> {
        match self.repo.find_title(title_id).await? {
            Some(_) => Ok(()),
            None => Err(ContentError::TitleNotFound),
        }
    }

    async fn find(&self, title_id: TitleId, review_id: ReviewId) -> ContentResult<Review> {
        self.require_title(title_id).await?;
        self.repo
            .find_review(title_id, review_id)
            .await?
            .ok_or(ContentError::ReviewNotFound)
    }
}

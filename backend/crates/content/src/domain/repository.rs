//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure layer.

use kernel::id::{CommentId, ReviewId, TitleId};

use crate::domain::entity::{
    Comment, NewComment, NewReview, Review, Taxon, TaxonKind, Title, TitleDraft, TitleFilter,
};
use crate::domain::value_object::Slug;
use crate::error::ContentResult;

/// Category and genre repository trait
#[trait_variant::make(TaxonRepository: Send)]
pub trait LocalTaxonRepository {
    /// Ordered by name, optionally filtered by a name substring
    async fn list_taxa(&self, kind: TaxonKind, search: Option<&str>) -> ContentResult<Vec<Taxon>>;

    /// Fails with `DuplicateSlug` when the slug is taken
    async fn create_taxon(&self, kind: TaxonKind, taxon: &Taxon) -> ContentResult<()>;

    /// Titles lose the category, or just the genre association
    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> ContentResult<bool>;
}

/// Title repository trait
///
/// Every returned [`Title`] carries its rating computed at read time.
#[trait_variant::make(TitleRepository: Send)]
pub trait LocalTitleRepository {
    async fn list_titles(&self, filter: &TitleFilter) -> ContentResult<Vec<Title>>;

    async fn find_title(&self, title_id: TitleId) -> ContentResult<Option<Title>>;

    /// Fails with `UnknownCategory` / `UnknownGenre` for slugs that name nothing
    async fn create_title(&self, draft: &TitleDraft) -> ContentResult<Title>;

    /// Replace the title's state with `draft`
    async fn update_title(&self, title_id: TitleId, draft: &TitleDraft) -> ContentResult<Title>;

    /// Cascades to reviews and their comments
    async fn delete_title(&self, title_id: TitleId) -> ContentResult<bool>;
}

/// Review repository trait
#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    async fn list_reviews(&self, title_id: TitleId) -> ContentResult<Vec<Review>>;

    /// A review, only if it belongs to `title_id`
    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<Option<Review>>;

    /// 一意性チェックと挿入は同時作成者に対して原子的
    ///
    /// 同じ (title, author) のレビューが既にあれば `DuplicateReview`。
    /// アプリ層の事前チェックではなく、ストア側の制約で保証する。
    async fn create_review(&self, review: &NewReview) -> ContentResult<Review>;

    /// Persist text and score; uniqueness is not re-checked
    async fn update_review(&self, review: &Review) -> ContentResult<()>;

    /// Cascades to comments
    async fn delete_review(&self, review_id: ReviewId) -> ContentResult<bool>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn list_comments(&self, review_id: ReviewId) -> ContentResult<Vec<Comment>>;

    /// A comment, only if it belongs to `review_id`
    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> ContentResult<Option<Comment>>;

    /// Fails with `ReviewNotFound` if the review vanished meanwhile
    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment>;

    async fn update_comment(&self, comment: &Comment) -> ContentResult<()>;

    async fn delete_comment(&self, comment_id: CommentId) -> ContentResult<bool>;
}

/// Everything the content handlers need from a store
pub trait ContentStore:
    TaxonRepository
    + TitleRepository
    + ReviewRepository
    + CommentRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> ContentStore for T where
    T: TaxonRepository
        + TitleRepository
        + ReviewRepository
        + CommentRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

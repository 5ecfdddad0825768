//! In-Memory Content Store
//!
//! Used when no database is configured, and by tests. One async mutex guards
//! every table, so the review uniqueness check and the insert form a single
//! critical section. Authors are stored by id and resolved through the
//! identity store on read; a deleted user reads back as no author.

use std::collections::BTreeMap;
use std::sync::Arc;

use auth::MemoryIdentityStore;
use auth::domain::repository::UserRepository;
use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, TitleId, UserId};
use tokio::sync::Mutex;

use crate::domain::entity::{
    Author, Comment, NewComment, NewReview, Review, Taxon, TaxonKind, Title, TitleDraft,
    TitleFilter,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TaxonRepository, TitleRepository,
};
use crate::domain::services::average_score;
use crate::domain::value_object::{ReleaseYear, Score, Slug};
use crate::error::{ContentError, ContentResult};

#[derive(Debug, Clone)]
struct TitleRow {
    name: String,
    year: ReleaseYear,
    description: Option<String>,
    category: Option<Slug>,
    genres: Vec<Slug>,
}

#[derive(Debug, Clone)]
struct ReviewRow {
    title_id: TitleId,
    author_id: Option<UserId>,
    text: String,
    score: Score,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    review_id: ReviewId,
    author_id: Option<UserId>,
    text: String,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<Slug, String>,
    genres: BTreeMap<Slug, String>,
    titles: BTreeMap<i64, TitleRow>,
    reviews: BTreeMap<i64, ReviewRow>,
    comments: BTreeMap<i64, CommentRow>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn taxa(&self, kind: TaxonKind) -> &BTreeMap<Slug, String> {
        match kind {
            TaxonKind::Category => &self.categories,
            TaxonKind::Genre => &self.genres,
        }
    }

    fn taxa_mut(&mut self, kind: TaxonKind) -> &mut BTreeMap<Slug, String> {
        match kind {
            TaxonKind::Category => &mut self.categories,
            TaxonKind::Genre => &mut self.genres,
        }
    }

    fn taxon(&self, kind: TaxonKind, slug: &Slug) -> Option<Taxon> {
        self.taxa(kind).get(slug).map(|name| Taxon {
            name: name.clone(),
            slug: slug.clone(),
        })
    }

    /// Every referenced slug must exist
    fn check_references(&self, draft: &TitleDraft) -> ContentResult<()> {
        if let Some(slug) = &draft.category {
            if !self.categories.contains_key(slug) {
                return Err(TaxonKind::Category.unknown(slug.as_str()));
            }
        }
        if let Some(slug) = draft.genres.iter().find(|g| !self.genres.contains_key(*g)) {
            return Err(TaxonKind::Genre.unknown(slug.as_str()));
        }
        Ok(())
    }

    fn title(&self, id: i64) -> Option<Title> {
        let row = self.titles.get(&id)?;
        let mut genres: Vec<Taxon> = row
            .genres
            .iter()
            .filter_map(|slug| self.taxon(TaxonKind::Genre, slug))
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));

        let scores = self
            .reviews
            .values()
            .filter(|r| r.title_id.get() == id)
            .map(|r| r.score);

        Some(Title {
            id: TitleId::new(id),
            name: row.name.clone(),
            year: row.year,
            description: row.description.clone(),
            category: row
                .category
                .as_ref()
                .and_then(|slug| self.taxon(TaxonKind::Category, slug)),
            genres,
            rating: average_score(scores),
        })
    }

    fn title_row(draft: &TitleDraft) -> TitleRow {
        TitleRow {
            name: draft.name.clone(),
            year: draft.year,
            description: draft.description.clone(),
            category: draft.category.clone(),
            genres: draft.genres.clone(),
        }
    }

    fn remove_review(&mut self, review_id: i64) -> bool {
        self.comments.retain(|_, c| c.review_id.get() != review_id);
        self.reviews.remove(&review_id).is_some()
    }
}

/// Shared in-memory content store. Clones see the same data.
#[derive(Debug, Clone)]
pub struct MemoryContentStore {
    inner: Arc<Mutex<Tables>>,
    identities: MemoryIdentityStore,
}

impl MemoryContentStore {
    /// `identities` resolves author names
    pub fn new(identities: MemoryIdentityStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tables::default())),
            identities,
        }
    }

    /// Number of reviews across all titles
    pub async fn review_count(&self) -> usize {
        self.inner.lock().await.reviews.len()
    }

    /// Current author of a stored user id, `None` once the user is gone
    async fn author(&self, user_id: Option<UserId>) -> ContentResult<Option<Author>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let user = self
            .identities
            .find_by_id(&user_id)
            .await
            .map_err(|e| ContentError::Internal(e.to_string()))?;
        Ok(user.map(|u| Author {
            user_id: u.user_id,
            user_name: u.user_name.to_string(),
        }))
    }

    async fn review(&self, id: i64, row: ReviewRow) -> ContentResult<Review> {
        Ok(Review {
            id: ReviewId::new(id),
            title_id: row.title_id,
            text: row.text,
            score: row.score,
            author: self.author(row.author_id).await?,
            pub_date: row.pub_date,
        })
    }

    async fn comment(&self, id: i64, row: CommentRow) -> ContentResult<Comment> {
        Ok(Comment {
            id: CommentId::new(id),
            review_id: row.review_id,
            text: row.text,
            author: self.author(row.author_id).await?,
            pub_date: row.pub_date,
        })
    }
}

// ============================================================================
// Taxa
// ============================================================================

impl TaxonRepository for MemoryContentStore {
    async fn list_taxa(&self, kind: TaxonKind, search: Option<&str>) -> ContentResult<Vec<Taxon>> {
        let tables = self.inner.lock().await;
        let mut taxa: Vec<Taxon> = tables
            .taxa(kind)
            .iter()
            .map(|(slug, name)| Taxon {
                name: name.clone(),
                slug: slug.clone(),
            })
            .filter(|t| search.is_none_or(|s| t.name_contains(s)))
            .collect();
        taxa.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
        Ok(taxa)
    }

    async fn create_taxon(&self, kind: TaxonKind, taxon: &Taxon) -> ContentResult<()> {
        let mut tables = self.inner.lock().await;
        let taxa = tables.taxa_mut(kind);
        if taxa.contains_key(&taxon.slug) {
            return Err(ContentError::DuplicateSlug);
        }
        taxa.insert(taxon.slug.clone(), taxon.name.clone());
        Ok(())
    }

    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> ContentResult<bool> {
        let mut tables = self.inner.lock().await;
        if tables.taxa_mut(kind).remove(slug).is_none() {
            return Ok(false);
        }
        for title in tables.titles.values_mut() {
            match kind {
                TaxonKind::Category => {
                    if title.category.as_ref() == Some(slug) {
                        title.category = None;
                    }
                }
                TaxonKind::Genre => title.genres.retain(|g| g != slug),
            }
        }
        Ok(true)
    }
}

// ============================================================================
// Titles
// ============================================================================

impl TitleRepository for MemoryContentStore {
    async fn list_titles(&self, filter: &TitleFilter) -> ContentResult<Vec<Title>> {
        let tables = self.inner.lock().await;
        let mut titles: Vec<Title> = tables
            .titles
            .keys()
            .filter_map(|&id| tables.title(id))
            .filter(|t| filter.matches(t))
            .collect();
        titles.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(titles)
    }

    async fn find_title(&self, title_id: TitleId) -> ContentResult<Option<Title>> {
        Ok(self.inner.lock().await.title(title_id.get()))
    }

    async fn create_title(&self, draft: &TitleDraft) -> ContentResult<Title> {
        let mut tables = self.inner.lock().await;
        tables.check_references(draft)?;

        let id = tables.next_id();
        tables.titles.insert(id, Tables::title_row(draft));
        tables
            .title(id)
            .ok_or_else(|| ContentError::Internal("title vanished after insert".to_string()))
    }

    async fn update_title(&self, title_id: TitleId, draft: &TitleDraft) -> ContentResult<Title> {
        let mut tables = self.inner.lock().await;
        if !tables.titles.contains_key(&title_id.get()) {
            return Err(ContentError::TitleNotFound);
        }
        tables.check_references(draft)?;

        tables.titles.insert(title_id.get(), Tables::title_row(draft));
        tables.title(title_id.get()).ok_or(ContentError::TitleNotFound)
    }

    async fn delete_title(&self, title_id: TitleId) -> ContentResult<bool> {
        let mut tables = self.inner.lock().await;
        if tables.titles.remove(&title_id.get()).is_none() {
            return Ok(false);
        }
        let reviews: Vec<i64> = tables
            .reviews
            .iter()
            .filter(|(_, r)| r.title_id == title_id)
            .map(|(&id, _)| id)
            .collect();
        for id in reviews {
            tables.remove_review(id);
        }
        Ok(true)
    }
}

// ============================================================================
// Reviews
// ============================================================================

impl ReviewRepository for MemoryContentStore {
    async fn list_reviews(&self, title_id: TitleId) -> ContentResult<Vec<Review>> {
        let rows: Vec<(i64, ReviewRow)> = {
            let tables = self.inner.lock().await;
            tables
                .reviews
                .iter()
                .filter(|(_, r)| r.title_id == title_id)
                .map(|(&id, r)| (id, r.clone()))
                .collect()
        };

        let mut reviews = Vec::with_capacity(rows.len());
        for (id, row) in rows {
            reviews.push(self.review(id, row).await?);
        }
        Ok(reviews)
    }

    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<Option<Review>> {
        let row = {
            let tables = self.inner.lock().await;
            tables
                .reviews
                .get(&review_id.get())
                .filter(|r| r.title_id == title_id)
                .cloned()
        };
        match row {
            Some(row) => Ok(Some(self.review(review_id.get(), row).await?)),
            None => Ok(None),
        }
    }

    async fn create_review(&self, review: &NewReview) -> ContentResult<Review> {
        let mut tables = self.inner.lock().await;

        if !tables.titles.contains_key(&review.title_id.get()) {
            return Err(ContentError::TitleNotFound);
        }
        let author_id = review.author.user_id;
        if tables
            .reviews
            .values()
            .any(|r| r.title_id == review.title_id && r.author_id == Some(author_id))
        {
            return Err(ContentError::DuplicateReview);
        }

        let id = tables.next_id();
        tables.reviews.insert(
            id,
            ReviewRow {
                title_id: review.title_id,
                author_id: Some(author_id),
                text: review.text.clone(),
                score: review.score,
                pub_date: review.pub_date,
            },
        );

        Ok(Review {
            id: ReviewId::new(id),
            title_id: review.title_id,
            text: review.text.clone(),
            score: review.score,
            author: Some(review.author.clone()),
            pub_date: review.pub_date,
        })
    }

    async fn update_review(&self, review: &Review) -> ContentResult<()> {
        let mut tables = self.inner.lock().await;
        let row = tables
            .reviews
            .get_mut(&review.id.get())
            .ok_or(ContentError::ReviewNotFound)?;
        row.text = review.text.clone();
        row.score = review.score;
        Ok(())
    }

    async fn delete_review(&self, review_id: ReviewId) -> ContentResult<bool> {
        Ok(self.inner.lock().await.remove_review(review_id.get()))
    }
}

// ============================================================================
// Comments
// ============================================================================

impl CommentRepository for MemoryContentStore {
    async fn list_comments(&self, review_id: ReviewId) -> ContentResult<Vec<Comment>> {
        let rows: Vec<(i64, CommentRow)> = {
            let tables = self.inner.lock().await;
            tables
                .comments
                .iter()
                .filter(|(_, c)| c.review_id == review_id)
                .map(|(&id, c)| (id, c.clone()))
                .collect()
        };

        let mut comments = Vec::with_capacity(rows.len());
        for (id, row) in rows {
            comments.push(self.comment(id, row).await?);
        }
        Ok(comments)
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> ContentResult<Option<Comment>> {
        let row = {
            let tables = self.inner.lock().await;
            tables
                .comments
                .get(&comment_id.get())
                .filter(|c| c.review_id == review_id)
                .cloned()
        };
        match row {
            Some(row) => Ok(Some(self.comment(comment_id.get(), row).await?)),
            None => Ok(None),
        }
    }

    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment> {
        let mut tables = self.inner.lock().await;
        if !tables.reviews.contains_key(&comment.review_id.get()) {
            return Err(ContentError::ReviewNotFound);
        }

        let id = tables.next_id();
        tables.comments.insert(
            id,
            CommentRow {
                review_id: comment.review_id,
                author_id: Some(comment.author.user_id),
                text: comment.text.clone(),
                pub_date: comment.pub_date,
            },
        );

        Ok(Comment {
            id: CommentId::new(id),
            review_id: comment.review_id,
            text: comment.text.clone(),
            author: Some(comment.author.clone()),
            pub_date: comment.pub_date,
        })
    }

    async fn update_comment(&self, comment: &Comment) -> ContentResult<()> {
        let mut tables = self.inner.lock().await;
        let row = tables
            .comments
            .get_mut(&comment.id.get())
            .ok_or(ContentError::CommentNotFound)?;
        row.text = comment.text.clone();
        Ok(())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> ContentResult<bool> {
        Ok(self
            .inner
            .lock()
            .await
            .comments
            .remove(&comment_id.get())
            .is_some())
    }
}

//! PostgreSQL Repository Implementation
//!
//! Ratings are computed in SQL on every read with `ROUND(AVG(score))`.
//! Review uniqueness rests on the `uq_reviews_title_author` constraint, so
//! concurrent creators race at the database and exactly one insert wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::error::conversions::{foreign_key_violation, unique_violation};
use kernel::id::{CommentId, ReviewId, TitleId, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    Author, Comment, NewComment, NewReview, Review, Taxon, TaxonKind, Title, TitleDraft,
    TitleFilter,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TaxonRepository, TitleRepository,
};
use crate::domain::value_object::{ReleaseYear, Score, Slug};
use crate::error::{ContentError, ContentResult};

/// PostgreSQL-backed content repository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Titles passing `filter` (or just `id`), with category, genres and rating
    async fn fetch_titles(&self, filter: &TitleFilter, id: Option<TitleId>) -> ContentResult<Vec<Title>> {
        let rows = sqlx::query_as::<_, TitleRow>(
            r#"
            SELECT
                t.id,
                t.name,
                t.year,
                t.description,
                c.name AS category_name,
                c.slug AS category_slug,
                (SELECT ROUND(AVG(r.score))::int FROM reviews r WHERE r.title_id = t.id) AS rating
            FROM titles t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE ($1::bigint IS NULL OR t.id = $1)
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1
                    FROM title_genres tg
                    JOIN genres g ON g.id = tg.genre_id
                    WHERE tg.title_id = t.id AND g.slug = $2
                  ))
              AND ($3::text IS NULL OR c.slug = $3)
              AND ($4::int IS NULL OR t.year = $4)
              AND ($5::text IS NULL OR strpos(lower(t.name), lower($5)) > 0)
            ORDER BY t.name COLLATE "C", t.id
            "#,
        )
        .bind(id.map(|id| id.get()))
        .bind(filter.genre.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.year)
        .bind(filter.name.as_deref())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let genre_rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name COLLATE "C"
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i64, Vec<Taxon>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.title_id).or_default().push(Taxon {
                name: row.name,
                slug: Slug::from_db(row.slug),
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = genres.remove(&row.id).unwrap_or_default();
                row.into_title(genres)
            })
            .collect())
    }

    /// Write category and genre links for `title_id`; every slug must exist
    async fn link_taxa(
        tx: &mut Transaction<'_, Postgres>,
        title_id: i64,
        draft: &TitleDraft,
    ) -> ContentResult<()> {
        let category_id = match &draft.category {
            Some(slug) => Some(
                sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1 FOR SHARE")
                    .bind(slug.as_str())
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or_else(|| TaxonKind::Category.unknown(slug.as_str()))?,
            ),
            None => None,
        };

        let slugs: Vec<String> = draft.genres.iter().map(|s| s.to_string()).collect();
        let found = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, slug FROM genres WHERE slug = ANY($1) FOR SHARE",
        )
        .bind(&slugs)
        .fetch_all(&mut **tx)
        .await?;

        if let Some(missing) = slugs
            .iter()
            .find(|slug| !found.iter().any(|(_, s)| s == *slug))
        {
            return Err(TaxonKind::Genre.unknown(missing.as_str()));
        }
        let genre_ids: Vec<i64> = found.into_iter().map(|(id, _)| id).collect();

        sqlx::query("UPDATE titles SET category_id = $2 WHERE id = $1")
            .bind(title_id)
            .bind(category_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("INSERT INTO title_genres (title_id, genre_id) SELECT $1, UNNEST($2::bigint[])")
            .bind(title_id)
            .bind(&genre_ids)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn title_or_missing(&self, title_id: TitleId) -> ContentResult<Title> {
        self.find_title(title_id)
            .await?
            .ok_or(ContentError::TitleNotFound)
    }
}

fn taxon_table(kind: TaxonKind) -> &'static str {
    match kind {
        TaxonKind::Category => "categories",
        TaxonKind::Genre => "genres",
    }
}

// ============================================================================
// Taxa
// ============================================================================

impl TaxonRepository for PgContentRepository {
    async fn list_taxa(&self, kind: TaxonKind, search: Option<&str>) -> ContentResult<Vec<Taxon>> {
        let rows = sqlx::query_as::<_, (String, String)>(&format!(
            r#"
            SELECT name, slug
            FROM {}
            WHERE $1::text IS NULL OR strpos(lower(name), lower($1)) > 0
            ORDER BY name COLLATE "C", slug
            "#,
            taxon_table(kind)
        ))
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, slug)| Taxon {
                name,
                slug: Slug::from_db(slug),
            })
            .collect())
    }

    async fn create_taxon(&self, kind: TaxonKind, taxon: &Taxon) -> ContentResult<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2)",
            taxon_table(kind)
        ))
        .bind(&taxon.name)
        .bind(taxon.slug.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err).as_deref() {
            Some("uq_categories_slug" | "uq_genres_slug") => ContentError::DuplicateSlug,
            _ => ContentError::Database(err),
        })?;

        Ok(())
    }

    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> ContentResult<bool> {
        // titles.category_id is ON DELETE SET NULL, title_genres cascades
        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE slug = $1", taxon_table(kind)))
            .bind(slug.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Titles
// ============================================================================

impl TitleRepository for PgContentRepository {
    async fn list_titles(&self, filter: &TitleFilter) -> ContentResult<Vec<Title>> {
        self.fetch_titles(filter, None).await
    }

    async fn find_title(&self, title_id: TitleId) -> ContentResult<Option<Title>> {
        let titles = self
            .fetch_titles(&TitleFilter::default(), Some(title_id))
            .await?;
        Ok(titles.into_iter().next())
    }

    async fn create_title(&self, draft: &TitleDraft) -> ContentResult<Title> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO titles (name, year, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&draft.name)
        .bind(draft.year.get())
        .bind(draft.description.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        Self::link_taxa(&mut tx, id, draft).await?;
        tx.commit().await?;

        self.title_or_missing(TitleId::new(id)).await
    }

    async fn update_title(&self, title_id: TitleId, draft: &TitleDraft) -> ContentResult<Title> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE titles SET name = $2, year = $3, description = $4 WHERE id = $1")
            .bind(title_id.get())
            .bind(&draft.name)
            .bind(draft.year.get())
            .bind(draft.description.as_deref())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ContentError::TitleNotFound);
        }

        Self::link_taxa(&mut tx, title_id.get(), draft).await?;
        tx.commit().await?;

        self.title_or_missing(title_id).await
    }

    async fn delete_title(&self, title_id: TitleId) -> ContentResult<bool> {
        // reviews cascade, and their comments with them
        let deleted = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(title_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Reviews
// ============================================================================

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.title_id, r.text, r.score, r.pub_date, r.author_id, u.user_name AS author_name
    FROM reviews r
    LEFT JOIN users u ON u.user_id = r.author_id
"#;

impl ReviewRepository for PgContentRepository {
    async fn list_reviews(&self, title_id: TitleId) -> ContentResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 ORDER BY r.id"
        ))
        .bind(title_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewRow::into_review).collect())
    }

    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> ContentResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.id = $1 AND r.title_id = $2"
        ))
        .bind(review_id.get())
        .bind(title_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn create_review(&self, review: &NewReview) -> ContentResult<Review> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score, pub_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(review.title_id.get())
        .bind(review.author.user_id.as_uuid())
        .bind(&review.text)
        .bind(review.score.get())
        .bind(review.pub_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if unique_violation(&err).as_deref() == Some("uq_reviews_title_author") {
                ContentError::DuplicateReview
            } else if foreign_key_violation(&err).as_deref() == Some("fk_reviews_title") {
                ContentError::TitleNotFound
            } else {
                ContentError::Database(err)
            }
        })?;

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
        let updated = sqlx::query("UPDATE reviews SET text = $2, score = $3 WHERE id = $1")
            .bind(review.id.get())
            .bind(&review.text)
            .bind(review.score.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ContentError::ReviewNotFound);
        }
        Ok(())
    }

    async fn delete_review(&self, review_id: ReviewId) -> ContentResult<bool> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Comments
// ============================================================================

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.review_id, c.text, c.pub_date, c.author_id, u.user_name AS author_name
    FROM comments c
    LEFT JOIN users u ON u.user_id = c.author_id
"#;

impl CommentRepository for PgContentRepository {
    async fn list_comments(&self, review_id: ReviewId) -> ContentResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 ORDER BY c.id"
        ))
        .bind(review_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> ContentResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.id = $1 AND c.review_id = $2"
        ))
        .bind(comment_id.get())
        .bind(review_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (review_id, author_id, text, pub_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(comment.review_id.get())
        .bind(comment.author.user_id.as_uuid())
        .bind(&comment.text)
        .bind(comment.pub_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match foreign_key_violation(&err).as_deref() {
            Some("fk_comments_review") => ContentError::ReviewNotFound,
            _ => ContentError::Database(err),
        })?;

        Ok(Comment {
            id: CommentId::new(id),
            review_id: comment.review_id,
            text: comment.text.clone(),
            author: Some(comment.author.clone()),
            pub_date: comment.pub_date,
        })
    }

    async fn update_comment(&self, comment: &Comment) -> ContentResult<()> {
        let updated = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment.id.get())
            .bind(&comment.text)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ContentError::CommentNotFound);
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> ContentResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: Option<String>,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<i32>,
}

impl TitleRow {
    fn into_title(self, genres: Vec<Taxon>) -> Title {
        let category = match (self.category_name, self.category_slug) {
            (Some(name), Some(slug)) => Some(Taxon {
                name,
                slug: Slug::from_db(slug),
            }),
            _ => None,
        };

        Title {
            id: TitleId::new(self.id),
            name: self.name,
            year: ReleaseYear::from_db(self.year),
            description: self.description,
            category,
            genres,
            rating: self.rating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleGenreRow {
    title_id: i64,
    name: String,
    slug: String,
}

/// `LEFT JOIN users` yields no name once the author is deleted
fn author(author_id: Option<Uuid>, author_name: Option<String>) -> Option<Author> {
    match (author_id, author_name) {
        (Some(id), Some(user_name)) => Some(Author {
            user_id: UserId::from_uuid(id),
            user_name,
        }),
        _ => None,
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    text: String,
    score: i16,
    pub_date: DateTime<Utc>,
    author_id: Option<Uuid>,
    author_name: Option<String>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::new(self.id),
            title_id: TitleId::new(self.title_id),
            text: self.text,
            score: Score::from_db(self.score),
            author: author(self.author_id, self.author_name),
            pub_date: self.pub_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: Option<Uuid>,
    author_name: Option<String>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            review_id: ReviewId::new(self.review_id),
            text: self.text,
            author: author(self.author_id, self.author_name),
            pub_date: self.pub_date,
        }
    }
}

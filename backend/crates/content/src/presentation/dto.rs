//! Request/Response DTOs

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, TitleId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entity::{
    Author, Comment, Review, ReviewChanges, Taxon, Title, TitleChanges, TitleFilter, TitleInput,
};

/// `null` and an absent key mean different things in a PATCH body:
/// absent leaves the field alone, `null` clears it.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn author_name(author: &Option<Author>) -> Option<String> {
    author.as_ref().map(|a| a.user_name.clone())
}

// ============================================================================
// Categories & Genres
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TaxonRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaxonResponse {
    pub name: String,
    pub slug: String,
}

impl From<&Taxon> for TaxonResponse {
    fn from(taxon: &Taxon) -> Self {
        Self {
            name: taxon.name.clone(),
            slug: taxon.slug.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

// ============================================================================
// Titles
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TitleListQuery {
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
}

impl From<TitleListQuery> for TitleFilter {
    fn from(query: TitleListQuery) -> Self {
        Self {
            genre: query.genre,
            category: query.category,
            year: query.year,
            name: query.name,
        }
    }
}

/// `POST /titles`; `category` and `genre` are slugs
#[derive(Debug, Deserialize)]
pub struct TitleCreateRequest {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl From<TitleCreateRequest> for TitleInput {
    fn from(req: TitleCreateRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            category: req.category,
            genres: req.genre,
        }
    }
}

/// `PATCH /titles/{title_id}`
#[derive(Debug, Default, Deserialize)]
pub struct TitlePatchRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

impl From<TitlePatchRequest> for TitleChanges {
    fn from(req: TitlePatchRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            category: req.category,
            genres: req.genre,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleResponse {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<TaxonResponse>,
    pub category: Option<TaxonResponse>,
}

impl From<&Title> for TitleResponse {
    fn from(title: &Title) -> Self {
        Self {
            id: title.id,
            name: title.name.clone(),
            year: title.year.get(),
            rating: title.rating,
            description: title.description.clone(),
            genre: title.genres.iter().map(TaxonResponse::from).collect(),
            category: title.category.as_ref().map(TaxonResponse::from),
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub text: String,
    pub score: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatchRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

impl From<ReviewPatchRequest> for ReviewChanges {
    fn from(req: ReviewPatchRequest) -> Self {
        Self {
            text: req.text,
            score: req.score,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub text: String,
    /// Author's username, `null` once the author is deleted
    pub author: Option<String>,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

impl From<&Review> for ReviewResponse {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            text: review.text.clone(),
            author: author_name(&review.author),
            score: review.score.get(),
            pub_date: review.pub_date,
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPatchRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub text: String,
    pub author: Option<String>,
    pub pub_date: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text.clone(),
            author: author_name(&comment.author),
            pub_date: comment.pub_date,
        }
    }
}

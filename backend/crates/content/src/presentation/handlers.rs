//! HTTP Handlers

use std::sync::Arc;

use auth::policy::Actor;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::extract::Json;
use kernel::id::{CommentId, ReviewId, TitleId};

use crate::application::{
    CommentsUseCase, ReviewInput, ReviewsUseCase, TaxonomyUseCase, TitlesUseCase,
};
use crate::domain::entity::{TaxonKind, TitleFilter};
use crate::domain::repository::ContentStore;
use crate::error::ContentResult;
use crate::presentation::dto::{
    CommentPatchRequest, CommentRequest, CommentResponse, ReviewPatchRequest, ReviewRequest,
    ReviewResponse, SearchQuery, TaxonRequest, TaxonResponse, TitleCreateRequest,
    TitleListQuery, TitlePatchRequest, TitleResponse,
};

/// Shared state for content handlers
#[derive(Clone)]
pub struct ContentAppState<R: ContentStore> {
    pub repo: Arc<R>,
}

impl<R: ContentStore> ContentAppState<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }
}

type CommentPath = (TitleId, ReviewId, CommentId);

// ============================================================================
// Categories & Genres
// ============================================================================

async fn list_taxa<R: ContentStore>(
    state: ContentAppState<R>,
    kind: TaxonKind,
    actor: Actor,
    query: SearchQuery,
) -> ContentResult<Json<Vec<TaxonResponse>>> {
    let taxa = TaxonomyUseCase::new(state.repo, kind)
        .list(&actor, query.search.as_deref())
        .await?;
    Ok(Json(taxa.iter().map(TaxonResponse::from).collect()))
}

async fn create_taxon<R: ContentStore>(
    state: ContentAppState<R>,
    kind: TaxonKind,
    actor: Actor,
    req: TaxonRequest,
) -> ContentResult<(StatusCode, Json<TaxonResponse>)> {
    let taxon = TaxonomyUseCase::new(state.repo, kind)
        .create(&actor, req.name, req.slug)
        .await?;
    Ok((StatusCode::CREATED, Json(TaxonResponse::from(&taxon))))
}

async fn delete_taxon<R: ContentStore>(
    state: ContentAppState<R>,
    kind: TaxonKind,
    actor: Actor,
    slug: String,
) -> ContentResult<StatusCode> {
    TaxonomyUseCase::new(state.repo, kind)
        .delete(&actor, &slug)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /categories?search=
pub async fn list_categories<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Query(query): Query<SearchQuery>,
) -> ContentResult<Json<Vec<TaxonResponse>>> {
    list_taxa(state, TaxonKind::Category, actor, query).await
}

/// POST /categories
pub async fn create_category<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Json(req): Json<TaxonRequest>,
) -> ContentResult<(StatusCode, Json<TaxonResponse>)> {
    create_taxon(state, TaxonKind::Category, actor, req).await
}

/// DELETE /categories/{slug}
pub async fn delete_category<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(slug): Path<String>,
) -> ContentResult<StatusCode> {
    delete_taxon(state, TaxonKind::Category, actor, slug).await
}

/// GET /genres?search=
pub async fn list_genres<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Query(query): Query<SearchQuery>,
) -> ContentResult<Json<Vec<TaxonResponse>>> {
    list_taxa(state, TaxonKind::Genre, actor, query).await
}

/// POST /genres
pub async fn create_genre<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Json(req): Json<TaxonRequest>,
) -> ContentResult<(StatusCode, Json<TaxonResponse>)> {
    create_taxon(state, TaxonKind::Genre, actor, req).await
}

/// DELETE /genres/{slug}
pub async fn delete_genre<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(slug): Path<String>,
) -> ContentResult<StatusCode> {
    delete_taxon(state, TaxonKind::Genre, actor, slug).await
}

// ============================================================================
// Titles
// ============================================================================

/// GET /titles?genre=&category=&year=&name=
pub async fn list_titles<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Query(query): Query<TitleListQuery>,
) -> ContentResult<Json<Vec<TitleResponse>>> {
    let titles = TitlesUseCase::new(state.repo.clone())
        .list(&actor, &TitleFilter::from(query))
        .await?;
    Ok(Json(titles.iter().map(TitleResponse::from).collect()))
}

/// POST /titles
pub async fn create_title<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Json(req): Json<TitleCreateRequest>,
) -> ContentResult<(StatusCode, Json<TitleResponse>)> {
    let title = TitlesUseCase::new(state.repo.clone())
        .create(&actor, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(TitleResponse::from(&title))))
}

/// GET /titles/{title_id}
pub async fn get_title<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(title_id): Path<TitleId>,
) -> ContentResult<Json<TitleResponse>> {
    let title = TitlesUseCase::new(state.repo.clone())
        .get(&actor, title_id)
        .await?;
    Ok(Json(TitleResponse::from(&title)))
}

/// PATCH /titles/{title_id}
pub async fn patch_title<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(title_id): Path<TitleId>,
    Json(req): Json<TitlePatchRequest>,
) -> ContentResult<Json<TitleResponse>> {
    let title = TitlesUseCase::new(state.repo.clone())
        .update(&actor, title_id, req.into())
        .await?;
    Ok(Json(TitleResponse::from(&title)))
}

/// DELETE /titles/{title_id}
pub async fn delete_title<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(title_id): Path<TitleId>,
) -> ContentResult<StatusCode> {
    TitlesUseCase::new(state.repo.clone())
        .delete(&actor, title_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reviews
// ============================================================================

/// GET /titles/{title_id}/reviews
pub async fn list_reviews<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(title_id): Path<TitleId>,
) -> ContentResult<Json<Vec<ReviewResponse>>> {
    let reviews = ReviewsUseCase::new(state.repo.clone())
        .list(&actor, title_id)
        .await?;
    Ok(Json(reviews.iter().map(ReviewResponse::from).collect()))
}

/// POST /titles/{title_id}/reviews
pub async fn create_review<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(title_id): Path<TitleId>,
    Json(req): Json<ReviewRequest>,
) -> ContentResult<(StatusCode, Json<ReviewResponse>)> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .create(
            &actor,
            title_id,
            ReviewInput {
                text: req.text,
                score: req.score,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(&review))))
}

/// GET /titles/{title_id}/reviews/{review_id}
pub async fn get_review<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
) -> ContentResult<Json<ReviewResponse>> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .get(&actor, title_id, review_id)
        .await?;
    Ok(Json(ReviewResponse::from(&review)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}
pub async fn patch_review<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
    Json(req): Json<ReviewPatchRequest>,
) -> ContentResult<Json<ReviewResponse>> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .update(&actor, title_id, review_id, req.into())
        .await?;
    Ok(Json(ReviewResponse::from(&review)))
}

/// DELETE /titles/{title_id}/reviews/{review_id}
pub async fn delete_review<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
) -> ContentResult<StatusCode> {
    ReviewsUseCase::new(state.repo.clone())
        .delete(&actor, title_id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
) -> ContentResult<Json<Vec<CommentResponse>>> {
    let comments = CommentsUseCase::new(state.repo.clone())
        .list(&actor, title_id, review_id)
        .await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
    Json(req): Json<CommentRequest>,
) -> ContentResult<(StatusCode, Json<CommentResponse>)> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .create(&actor, title_id, review_id, req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(path): Path<CommentPath>,
) -> ContentResult<Json<CommentResponse>> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .get(&actor, path)
        .await?;
    Ok(Json(CommentResponse::from(&comment)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn patch_comment<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(path): Path<CommentPath>,
    Json(req): Json<CommentPatchRequest>,
) -> ContentResult<Json<CommentResponse>> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .update(&actor, path, req.text)
        .await?;
    Ok(Json(CommentResponse::from(&comment)))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment<R: ContentStore>(
    State(state): State<ContentAppState<R>>,
    actor: Actor,
    Path(path): Path<CommentPath>,
) -> ContentResult<StatusCode> {
    CommentsUseCase::new(state.repo.clone())
        .delete(&actor, path)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

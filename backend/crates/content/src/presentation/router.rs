//! Content Router

use axum::{
    Router,
    routing::{delete, get},
};

use crate::domain::repository::ContentStore;
use crate::presentation::handlers::{self, ContentAppState};

/// Catalog and review routes
///
/// Reads are open to anonymous callers; the caller is taken from the
/// [`Actor`](auth::policy::Actor) that `auth::middleware::resolve_actor`
/// attaches to the request.
pub fn content_router<R: ContentStore>(repo: R) -> Router {
    let state = ContentAppState::new(repo);

    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories::<R>).post(handlers::create_category::<R>),
        )
        .route("/categories/{slug}", delete(handlers::delete_category::<R>))
        .route(
            "/genres",
            get(handlers::list_genres::<R>).post(handlers::create_genre::<R>),
        )
        .route("/genres/{slug}", delete(handlers::delete_genre::<R>))
        .route(
            "/titles",
            get(handlers::list_titles::<R>).post(handlers::create_title::<R>),
        )
        .route(
            "/titles/{title_id}",
            get(handlers::get_title::<R>)
                .patch(handlers::patch_title::<R>)
                .delete(handlers::delete_title::<R>),
        )
        .route(
            "/titles/{title_id}/reviews",
            get(handlers::list_reviews::<R>).post(handlers::create_review::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(handlers::get_review::<R>)
                .patch(handlers::patch_review::<R>)
                .delete(handlers::delete_review::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(handlers::list_comments::<R>).post(handlers::create_comment::<R>),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(handlers::get_comment::<R>)
                .patch(handlers::patch_comment::<R>)
                .delete(handlers::delete_comment::<R>),
        )
        .with_state(state)
}

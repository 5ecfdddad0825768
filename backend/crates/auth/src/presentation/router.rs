//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};

use platform::mail::Mailer;

use crate::domain::repository::IdentityStore;
use crate::presentation::handlers::{self, AuthAppState};

/// Identity routes: signup, token exchange, own profile, user administration
///
/// Expects [`resolve_actor`](crate::presentation::middleware::resolve_actor)
/// to be layered around the final router.
pub fn auth_router<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/signup", post(handlers::sign_up::<R, M>))
        .route("/auth/token", post(handlers::issue_token::<R, M>))
        .route(
            "/users/me",
            get(handlers::get_me::<R, M>).patch(handlers::patch_me::<R, M>),
        )
        .route(
            "/users",
            get(handlers::list_users::<R, M>).post(handlers::create_user::<R, M>),
        )
        .route(
            "/users/{username}",
            get(handlers::get_user::<R, M>)
                .patch(handlers::patch_user::<R, M>)
                .delete(handlers::delete_user::<R, M>),
        )
        .with_state(state)
}

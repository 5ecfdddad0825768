//! Auth Middleware
//!
//! Resolves the `Authorization` header into an [`Actor`] request extension.
//! Handlers take `Actor` as an extractor; without the middleware every
//! caller is anonymous.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::{BearerCredential, extract_bearer};

use crate::application::token::TokenService;
use crate::domain::policy::actor::Actor;
use crate::error::AuthError;

/// Middleware that attaches the caller's [`Actor`]
///
/// - no header: anonymous
/// - valid bearer token: authenticated
/// - anything else: 401, the request does not reach the handler
pub async fn resolve_actor(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let actor = match extract_bearer(req.headers()) {
        BearerCredential::Absent => Actor::Anonymous,
        BearerCredential::Token(token) => Actor::Authenticated(tokens.verify(&token)?),
        BearerCredential::Malformed => return Err(AuthError::InvalidToken),
    };

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Actor>().cloned().unwrap_or_default())
    }
}

//! Glue between the content use cases and the shared permission evaluator

use auth::policy::{AccessRequest, Action, Actor, Resource, authorize};

use crate::domain::entity::Author;
use crate::error::{ContentError, ContentResult};

pub(crate) fn require(actor: &Actor, action: Action, resource: Resource) -> ContentResult<()> {
    authorize(&AccessRequest::new(actor, action, resource))?;
    Ok(())
}

/// Anonymous callers never change content; refuse them before any lookup
pub(crate) fn signed_in(actor: &Actor) -> ContentResult<()> {
    if actor.is_authenticated() {
        Ok(())
    } else {
        Err(ContentError::Unauthenticated)
    }
}

/// The caller as the author of new content
pub(crate) fn author_of(actor: &Actor) -> ContentResult<Author> {
    actor
        .principal()
        .map(Author::from)
        .ok_or(ContentError::Unauthenticated)
}

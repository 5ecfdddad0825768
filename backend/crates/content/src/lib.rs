//! Content (Catalog & Reviews) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, rating aggregation, repository traits
//! - `application/` - Use cases, each authorizing through `auth::policy`
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Categories and genres addressed by slug, admin-managed
//! - Titles with one optional category, one or more genres and a derived rating
//! - At most one review per author per title, enforced by the store
//! - Comments under reviews; authors, moderators and admins may edit or delete
//!
//! ## Consistency Model
//! - The rating is never stored; every read recomputes `round(mean(score))`
//! - Deleting a title removes its reviews and their comments
//! - Deleting a user keeps their reviews and comments with no author

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use domain::repository::ContentStore;
pub use error::{ContentError, ContentResult};
pub use infra::{memory::MemoryContentStore, postgres::PgContentRepository};
pub use presentation::router::content_router;

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

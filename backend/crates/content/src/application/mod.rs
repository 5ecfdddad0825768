//! Application Layer - Use Cases
//!
//! Every use case takes the caller's [`Actor`](auth::policy::Actor) and asks
//! the shared permission evaluator before touching the store.

mod access;
pub mod comments;
pub mod reviews;
pub mod taxonomy;
pub mod titles;

pub use comments::CommentsUseCase;
pub use reviews::{ReviewInput, ReviewsUseCase};
pub use taxonomy::TaxonomyUseCase;
pub use titles::TitlesUseCase;

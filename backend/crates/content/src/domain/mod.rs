//! Domain Layer
//!
//! This layer contains:
//! - Entities (Taxon, Title, Review, Comment)
//! - Value objects (Slug, Score, ReleaseYear)
//! - Domain services (rating)
//! - Repository traits (interfaces)

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

pub use repository::{
    CommentRepository, ContentStore, ReviewRepository, TaxonRepository, TitleRepository,
};

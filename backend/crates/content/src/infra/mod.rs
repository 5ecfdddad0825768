//! Infrastructure Layer
//!
//! PostgreSQL repository and an in-memory store for development and tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryContentStore;
pub use postgres::PgContentRepository;

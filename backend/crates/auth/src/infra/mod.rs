//! Infrastructure Layer
//!
//! Database implementations and an in-memory store for development and tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityRepository;

//! Auth (Identity & Access) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, access policy, repository traits
//! - `application/` - Use cases, token service, configuration
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Passwordless signup: a confirmation code is mailed for a (user name, email) pair
//! - Code exchange for an HS256 bearer token
//! - Role model (User, Moderator, Admin) with a separate superuser flag
//! - Permission evaluator over `(actor, action, resource)`, shared with the content crate
//! - Own-profile editing and admin-only user administration
//!
//! ## Security Model
//! - Codes compared in constant time and expire after a configurable TTL
//! - Signup is one transaction: user, code and mail succeed or fail together
//! - Tokens carry the role at issuance; a role change applies to the next token

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::TokenService;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryIdentityStore, postgres::PgIdentityRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod policy {
    pub use crate::domain::policy::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

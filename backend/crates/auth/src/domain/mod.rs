//! Domain Layer
//!
//! Contains entities, value objects, the access policy, and repository traits.

pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{confirmation_code::ConfirmationCode, user::User};
pub use policy::{AccessDenied, AccessRequest, Action, Actor, Principal, Resource, RoleTag, authorize};
pub use repository::{ConfirmationCodeRepository, IdentityStore, Registration, UserRepository};

//! Value Objects
//!
//! Immutable, validated domain primitives.

pub mod email;
pub mod person_name;
pub mod user_id;
pub mod user_name;
pub mod user_role;

pub use email::Email;
pub use person_name::PersonName;
pub use user_id::UserId;
pub use user_name::UserName;
pub use user_role::UserRole;

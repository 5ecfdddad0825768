//! Application Layer
//!
//! Use cases and application services.

pub mod code_generator;
pub mod config;
pub mod issue_token;
pub mod manage_users;
pub mod profile;
pub mod sign_up;
pub mod token;

// Re-exports
pub use code_generator::{CodeGenerator, RandomCodeGenerator};
pub use config::AuthConfig;
pub use issue_token::{IssueTokenInput, IssueTokenOutput, IssueTokenUseCase};
pub use manage_users::{ManageUsersUseCase, NewUserInput};
pub use profile::{ProfileUseCase, UserChanges};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token::{Claims, TokenService};

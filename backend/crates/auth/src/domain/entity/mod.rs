pub mod confirmation_code;
pub mod user;

pub use confirmation_code::ConfirmationCode;
pub use user::{SignupMatch, User};

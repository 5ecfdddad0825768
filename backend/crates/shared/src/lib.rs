//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the identity and content crates:
//! - The unified error type and its HTTP classification
//! - Field-level validation failures
//! - Typed identifiers (UUID for people, serial integers for content rows)
//! - The JSON body extractor whose rejections render like every other error
//!
//! Anything placed here must mean the same thing in every bounded context.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod validation;

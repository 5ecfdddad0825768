//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Random confirmation codes and constant-time comparison
//! - Bearer credential extraction from request headers
//! - Outbound mail delivery (SMTP, log sink, in-memory outbox)

pub mod bearer;
pub mod crypto;
pub mod mail;

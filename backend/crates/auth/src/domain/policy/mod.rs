//! Access Policy
//!
//! - [`actor`]: who is calling, and the role tag they resolve to
//! - [`permission`]: composable predicates over `(actor, action, resource)`
//!   and the decision table every endpoint consults

pub mod actor;
pub mod permission;

pub use actor::{Actor, Principal, RoleTag, resolve_role};
pub use permission::{AccessDenied, AccessRequest, Action, Resource, authorize};

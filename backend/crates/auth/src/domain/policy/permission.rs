//! Permission Evaluator
//!
//! A decision is a pure function of an [`AccessRequest`]. Rules are built
//! from small predicates joined with [`Rule::Any`] / [`Rule::All`], so each
//! row of the access table is a value that can be tested on its own.
//!
//! | Resource            | anonymous | user        | moderator | admin |
//! |---------------------|-----------|-------------|-----------|-------|
//! | Catalog read        | allow     | allow       | allow     | allow |
//! | Catalog write       | deny      | deny        | deny      | allow |
//! | Content read        | allow     | allow       | allow     | allow |
//! | Content create      | deny      | allow       | allow     | allow |
//! | Content update/del  | deny      | owner only  | allow     | allow |
//! | Own profile r/patch | deny      | allow       | allow     | allow |
//! | User administration | deny      | deny        | deny      | allow |

use derive_more::Display;

use super::actor::{Actor, RoleTag, resolve_role};
use crate::domain::value_object::user_id::UserId;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    #[display("read")]
    Read,
    #[display("create")]
    Create,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
}

impl Action {
    /// Read-only requests
    pub const fn is_safe(self) -> bool {
        matches!(self, Action::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Category, Genre, Title
    Catalog,
    /// Review or Comment. `owner` is the author at check time, `None` for a
    /// collection or when the author has been deleted.
    Content { owner: Option<UserId> },
    /// The caller's own profile
    OwnProfile,
    /// Listing, creating and editing arbitrary users
    UserAdministration,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub actor: &'a Actor,
    pub action: Action,
    pub resource: Resource,
}

impl<'a> AccessRequest<'a> {
    pub fn new(actor: &'a Actor, action: Action, resource: Resource) -> Self {
        Self {
            actor,
            action,
            resource,
        }
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// Anonymous caller; presenting a token might help
    #[error("authentication required")]
    Unauthenticated,
    /// Authenticated caller lacking the role or ownership
    #[error("permission denied")]
    Forbidden,
}

// ============================================================================
// Predicates
// ============================================================================

pub type Predicate = fn(&AccessRequest<'_>) -> bool;

pub fn is_safe(req: &AccessRequest<'_>) -> bool {
    req.action.is_safe()
}

pub fn is_create(req: &AccessRequest<'_>) -> bool {
    req.action == Action::Create
}

pub fn is_change(req: &AccessRequest<'_>) -> bool {
    matches!(req.action, Action::Update | Action::Delete)
}

pub fn is_authenticated(req: &AccessRequest<'_>) -> bool {
    req.actor.is_authenticated()
}

pub fn is_moderator_or_higher(req: &AccessRequest<'_>) -> bool {
    matches!(resolve_role(req.actor), RoleTag::Moderator | RoleTag::Admin)
}

pub fn is_admin(req: &AccessRequest<'_>) -> bool {
    resolve_role(req.actor) == RoleTag::Admin
}

/// The caller is the recorded author. Orphaned content has no owner.
pub fn is_owner(req: &AccessRequest<'_>) -> bool {
    match (req.resource, req.actor.user_id()) {
        (Resource::Content { owner: Some(owner) }, Some(caller)) => owner == caller,
        _ => false,
    }
}

/// Profiles are read and patched, never created or deleted through `/users/me`
pub fn is_profile_action(req: &AccessRequest<'_>) -> bool {
    matches!(req.action, Action::Read | Action::Update)
}

// ============================================================================
// Combinators
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Is(Predicate),
    Any(&'static [Rule]),
    All(&'static [Rule]),
}

impl Rule {
    pub fn holds(&self, req: &AccessRequest<'_>) -> bool {
        match self {
            Rule::Is(p) => p(req),
            Rule::Any(rules) => rules.iter().any(|r| r.holds(req)),
            Rule::All(rules) => rules.iter().all(|r| r.holds(req)),
        }
    }
}

pub const CATALOG_RULE: Rule = Rule::Any(&[Rule::Is(is_safe), Rule::Is(is_admin)]);

pub const CONTENT_RULE: Rule = Rule::Any(&[
    Rule::Is(is_safe),
    Rule::All(&[Rule::Is(is_create), Rule::Is(is_authenticated)]),
    Rule::All(&[
        Rule::Is(is_change),
        Rule::Any(&[Rule::Is(is_owner), Rule::Is(is_moderator_or_higher)]),
    ]),
]);

pub const OWN_PROFILE_RULE: Rule = Rule::All(&[Rule::Is(is_authenticated), Rule::Is(is_profile_action)]);

pub const USER_ADMINISTRATION_RULE: Rule = Rule::Is(is_admin);

pub const fn rule_for(resource: Resource) -> Rule {
    match resource {
        Resource::Catalog => CATALOG_RULE,
        Resource::Content { .. } => CONTENT_RULE,
        Resource::OwnProfile => OWN_PROFILE_RULE,
        Resource::UserAdministration => USER_ADMINISTRATION_RULE,
    }
}

/// Allow or refuse a request
pub fn authorize(req: &AccessRequest<'_>) -> Result<(), AccessDenied> {
    if rule_for(req.resource).holds(req) {
        return Ok(());
    }

    tracing::debug!(
        role = %resolve_role(req.actor),
        action = %req.action,
        resource = ?req.resource,
        "Access denied"
    );

    if req.actor.is_authenticated() {
        Err(AccessDenied::Forbidden)
    } else {
        Err(AccessDenied::Unauthenticated)
    }
}

//! Actor & Role Resolver

use derive_more::Display;

use crate::domain::entity::user::User;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

/// Identity captured in an access token at issuance time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub user_name: String,
    pub role: UserRole,
    pub is_superuser: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.to_string(),
            role: user.user_role,
            is_superuser: user.is_superuser,
        }
    }
}

/// The caller of a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(p) => Some(p),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.principal().map(|p| p.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated(_))
    }
}

/// 権限判定に使うロールタグ
///
/// 順序は同順位の判定用で、数値比較には使わない。
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleTag {
    #[display("anonymous")]
    Anonymous,
    #[display("user")]
    User,
    #[display("moderator")]
    Moderator,
    #[display("admin")]
    Admin,
}

/// Map an actor onto its role tag. A superuser is an admin whatever the stored role.
pub fn resolve_role(actor: &Actor) -> RoleTag {
    match actor {
        Actor::Anonymous => RoleTag::Anonymous,
        Actor::Authenticated(p) if p.is_superuser => RoleTag::Admin,
        Actor::Authenticated(p) => match p.role {
            UserRole::User => RoleTag::User,
            UserRole::Moderator => RoleTag::Moderator,
            UserRole::Admin => RoleTag::Admin,
        },
    }
}

//! Profile Use Case
//!
//! `/users/me`: the caller reads and edits their own profile. The role is
//! never editable here, whatever the caller's role.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::policy::{AccessRequest, Action, Actor, Resource, authorize};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, person_name::PersonName, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Partial update of a user. `None` leaves the field as is.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl UserChanges {
    /// Validate every present field, then apply them all
    pub fn apply(self, user: &mut User) -> AuthResult<()> {
        let user_name = self.user_name.map(UserName::new).transpose()?;
        let email = self.email.map(Email::new).transpose()?;
        let first_name = self
            .first_name
            .map(|v| PersonName::new("first_name", v))
            .transpose()?;
        let last_name = self
            .last_name
            .map(|v| PersonName::new("last_name", v))
            .transpose()?;
        let role = self.role.as_deref().map(UserRole::from_code).transpose()?;

        if let Some(v) = user_name {
            user.user_name = v;
        }
        if let Some(v) = email {
            user.email = v;
        }
        if let Some(v) = first_name {
            user.first_name = v;
        }
        if let Some(v) = last_name {
            user.last_name = v;
        }
        if let Some(v) = self.bio {
            user.bio = v;
        }
        if let Some(v) = role {
            user.user_role = v;
        }
        user.touch();
        Ok(())
    }
}

pub struct ProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, actor: &Actor) -> AuthResult<User> {
        authorize(&AccessRequest::new(actor, Action::Read, Resource::OwnProfile))?;
        self.load(actor).await
    }

    pub async fn update(&self, actor: &Actor, changes: UserChanges) -> AuthResult<User> {
        authorize(&AccessRequest::new(actor, Action::Update, Resource::OwnProfile))?;

        if changes.role.is_some() {
            return Err(AuthError::ForbiddenFieldMutation("role"));
        }

        let mut user = self.load(actor).await?;
        changes.apply(&mut user)?;
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, user_name = %user.user_name, "Profile updated");

        Ok(user)
    }

    async fn load(&self, actor: &Actor) -> AuthResult<User> {
        let principal = actor.principal().ok_or(AuthError::Unauthenticated)?;
        // token outlived its user
        self.repo
            .find_by_id(&principal.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

//! Manage Users Use Case
//!
//! The admin-only `/users` surface. Role changes are allowed here.

use std::sync::Arc;

use crate::application::profile::UserChanges;
use crate::domain::entity::user::User;
use crate::domain::policy::{AccessRequest, Action, Actor, Resource, authorize};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Input for creating a user directly
pub struct NewUserInput {
    pub user_name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

pub struct ManageUsersUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ManageUsersUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn require_admin(actor: &Actor, action: Action) -> AuthResult<()> {
        authorize(&AccessRequest::new(actor, action, Resource::UserAdministration))?;
        Ok(())
    }

    pub async fn list(&self, actor: &Actor, search: Option<&str>) -> AuthResult<Vec<User>> {
        Self::require_admin(actor, Action::Read)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.search(search).await
    }

    pub async fn create(&self, actor: &Actor, input: NewUserInput) -> AuthResult<User> {
        Self::require_admin(actor, Action::Create)?;

        let mut user = User::new(UserName::new(input.user_name)?, Email::new(input.email)?);
        UserChanges {
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            role: input.role,
            ..Default::default()
        }
        .apply(&mut user)?;

        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            role = %user.user_role,
            "User created by admin"
        );

        Ok(user)
    }

    pub async fn get(&self, actor: &Actor, user_name: &str) -> AuthResult<User> {
        Self::require_admin(actor, Action::Read)?;
        self.find(user_name).await
    }

    pub async fn update(&self, actor: &Actor, user_name: &str, changes: UserChanges) -> AuthResult<User> {
        Self::require_admin(actor, Action::Update)?;

        let mut user = self.find(user_name).await?;
        let previous_role = user.user_role;
        changes.apply(&mut user)?;
        self.repo.update(&user).await?;

        if user.user_role != previous_role {
            tracing::info!(
                user_id = %user.user_id,
                from = %previous_role,
                role = %user.user_role,
                "User role changed"
            );
        }

        Ok(user)
    }

    pub async fn delete(&self, actor: &Actor, user_name: &str) -> AuthResult<()> {
        Self::require_admin(actor, Action::Delete)?;

        let user = self.find(user_name).await?;
        if !self.repo.delete(&user.user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user.user_id, user_name = %user.user_name, "User deleted");
        Ok(())
    }

    async fn find(&self, user_name: &str) -> AuthResult<User> {
        // a malformed name cannot exist
        let Ok(user_name) = UserName::new(user_name) else {
            return Err(AuthError::UserNotFound);
        };
        self.repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

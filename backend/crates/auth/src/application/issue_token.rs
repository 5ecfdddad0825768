//! Issue Token Use Case
//!
//! Exchanges (user name, confirmation code) for an access token.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::repository::{ConfirmationCodeRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

pub struct IssueTokenInput {
    pub user_name: String,
    pub code: String,
}

#[derive(Debug)]
pub struct IssueTokenOutput {
    pub token: String,
}

pub struct IssueTokenUseCase<R>
where
    R: UserRepository + ConfirmationCodeRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R> IssueTokenUseCase<R>
where
    R: UserRepository + ConfirmationCodeRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    /// `UnknownUser` and `InvalidCode` stay distinct here; concealment is a
    /// rendering decision made by the caller.
    pub async fn execute(&self, input: IssueTokenInput) -> AuthResult<IssueTokenOutput> {
        let user_name = UserName::new(&input.user_name)?;

        let Some(user) = self.repo.find_by_user_name(&user_name).await? else {
            tracing::info!(user_name = %user_name, "Token requested for unknown user");
            return Err(AuthError::UnknownUser);
        };

        let stored = self.repo.find_code(&user_name).await?;
        let valid = stored.as_ref().is_some_and(|c| {
            c.matches(&input.code) && !c.is_expired(self.config.code_ttl_chrono(), Utc::now())
        });
        if !valid {
            tracing::info!(user_id = %user.user_id, "Confirmation code rejected");
            return Err(AuthError::InvalidCode);
        }

        if self.config.single_use_codes && !self.repo.consume_code(&user_name, &input.code).await? {
            // a concurrent exchange or a newer signup got there first
            return Err(AuthError::InvalidCode);
        }

        let token = self.tokens.issue(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            role = %user.user_role,
            "Access token issued"
        );

        Ok(IssueTokenOutput { token })
    }
}

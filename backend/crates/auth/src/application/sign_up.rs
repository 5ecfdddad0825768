//! Sign Up Use Case
//!
//! Registers a (user name, email) pair, or re-issues the code for an
//! existing exact pair, and mails a fresh confirmation code.

use std::sync::Arc;

use platform::mail::Mailer;

use crate::application::code_generator::CodeGenerator;
use crate::application::config::AuthConfig;
use crate::domain::entity::{confirmation_code::ConfirmationCode, user::User};
use crate::domain::repository::ConfirmationCodeRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_name: String,
    pub email: String,
}

/// Sign up use case
pub struct SignUpUseCase<R, M>
where
    R: ConfirmationCodeRepository,
    M: Mailer + Sync,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    codes: Arc<dyn CodeGenerator>,
    config: Arc<AuthConfig>,
}

impl<R, M> SignUpUseCase<R, M>
where
    R: ConfirmationCodeRepository,
    M: Mailer + Sync,
{
    pub fn new(
        repo: Arc<R>,
        mailer: Arc<M>,
        codes: Arc<dyn CodeGenerator>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            mailer,
            codes,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let user_name = UserName::new(input.user_name)?;
        let email = Email::new(input.email)?;

        let candidate = User::new(user_name.clone(), email.clone());
        let code = ConfirmationCode::new(user_name, self.codes.generate());
        let mail = self.config.confirmation_mail(email.as_str(), &code.code);

        let registration = self
            .repo
            .register_with_code(&candidate, &code, &mail, self.mailer.as_ref())
            .await?;

        tracing::info!(
            user_id = %registration.user.user_id,
            user_name = %registration.user.user_name,
            created = registration.created,
            "Confirmation code issued"
        );

        Ok(SignUpOutput {
            user_name: registration.user.user_name.into_inner(),
            email: registration.user.email.into_inner(),
        })
    }
}

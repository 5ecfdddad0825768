//! Router Assembly

use std::sync::Arc;

use auth::application::CodeGenerator;
use auth::domain::repository::IdentityStore;
use auth::middleware::resolve_actor;
use auth::presentation::AuthAppState;
use auth::{AuthConfig, auth_router};
use axum::Router;
use content::{ContentStore, content_router};
use platform::mail::{LogMailer, MailError, Mailer, OutgoingMail, SmtpMailer};

/// Path prefix of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Mail transport chosen at startup
#[derive(Clone)]
pub enum AppMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl Mailer for AppMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            AppMailer::Smtp(mailer) => mailer.send(mail).await,
            AppMailer::Log(mailer) => mailer.send(mail).await,
        }
    }
}

/// Identity and content routes under [`API_PREFIX`], with the caller
/// resolved from the bearer header on every request
pub fn build_router<R, M, C>(
    identities: R,
    mailer: M,
    content: C,
    codes: Arc<dyn CodeGenerator>,
    config: AuthConfig,
) -> Router
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
    C: ContentStore,
{
    let state = AuthAppState::new(identities, mailer, codes, config);
    let tokens = state.tokens.clone();

    let api = auth_router(state).merge(content_router(content));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(axum::middleware::from_fn_with_state(tokens, resolve_actor))
}

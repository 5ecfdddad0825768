//! HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::extract::Json;
use platform::mail::Mailer;

use crate::application::code_generator::CodeGenerator;
use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::application::{
    IssueTokenInput, IssueTokenUseCase, ManageUsersUseCase, NewUserInput, ProfileUseCase,
    SignUpInput, SignUpUseCase,
};
use crate::domain::policy::actor::Actor;
use crate::domain::repository::IdentityStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminUserPatchRequest, CreateUserRequest, ProfilePatchRequest, SignUpRequest, SignUpResponse,
    TokenRequest, TokenResponse, UserListQuery, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub codes: Arc<dyn CodeGenerator>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> AuthAppState<R, M>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, codes: Arc<dyn CodeGenerator>, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            codes,
            tokens: Arc::new(TokenService::new(&config)),
            config: Arc::new(config),
        }
    }
}

// derive(Clone) would require `M: Clone`
impl<R, M> Clone for AuthAppState<R, M>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            codes: self.codes.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Sign Up & Token
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<Json<SignUpResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.codes.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            user_name: req.username,
            email: req.email,
        })
        .await?;

    Ok(Json(SignUpResponse {
        username: output.user_name,
        email: output.email,
    }))
}

/// POST /auth/token
pub async fn issue_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<TokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = IssueTokenUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let result = use_case
        .execute(IssueTokenInput {
            user_name: req.username,
            code: req.confirmation_code,
        })
        .await;

    match result {
        Ok(output) => Ok(Json(TokenResponse {
            token: output.token,
        })),
        // already logged as unknown user by the use case
        Err(AuthError::UnknownUser) if state.config.conceal_token_failures => {
            Err(AuthError::InvalidCode)
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Own Profile
// ============================================================================

/// GET /users/me
pub async fn get_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone()).get(&actor).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /users/me
pub async fn patch_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Json(req): Json<ProfilePatchRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .update(&actor, req.into_changes())
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

// ============================================================================
// User Administration
// ============================================================================

/// GET /users?search=
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Query(query): Query<UserListQuery>,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let users = ManageUsersUseCase::new(state.repo.clone())
        .list(&actor, query.search.as_deref())
        .await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// POST /users
pub async fn create_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Json(req): Json<CreateUserRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .create(
            &actor,
            NewUserInput {
                user_name: req.username,
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
                bio: req.bio,
                role: req.role,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /users/{username}
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Path(username): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .get(&actor, &username)
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /users/{username}
pub async fn patch_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Path(username): Path<String>,
    Json(req): Json<AdminUserPatchRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .update(&actor, &username, req.into())
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /users/{username}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    actor: Actor,
    Path(username): Path<String>,
) -> AuthResult<StatusCode>
where
    R: IdentityStore,
    M: Mailer + Send + Sync + 'static,
{
    ManageUsersUseCase::new(state.repo.clone())
        .delete(&actor, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

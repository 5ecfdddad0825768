//! Identity flows end to end against the in-memory store

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use platform::mail::MemoryMailer;
use tower::ServiceExt;

use crate::application::code_generator::CodeGenerator;
use crate::application::{
    IssueTokenInput, IssueTokenUseCase, ManageUsersUseCase, ProfileUseCase, SignUpInput,
    SignUpUseCase, UserChanges,
};
use crate::domain::entity::user::User;
use crate::domain::policy::{Actor, Principal};
use crate::domain::repository::{ConfirmationCodeRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};
use crate::presentation::{AuthAppState, auth_router, resolve_actor};
use crate::{AuthConfig, AuthError, MemoryIdentityStore, TokenService};

/// Yields `CODE01`, `CODE02`, ...
#[derive(Default)]
struct SequenceCodes(AtomicUsize);

impl CodeGenerator for SequenceCodes {
    fn generate(&self) -> String {
        format!("CODE{:02}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

struct Harness {
    store: MemoryIdentityStore,
    mailer: MemoryMailer,
    codes: Arc<SequenceCodes>,
    config: Arc<AuthConfig>,
    tokens: Arc<TokenService>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(AuthConfig::development())
    }

    fn with_config(config: AuthConfig) -> Self {
        Self {
            store: MemoryIdentityStore::new(),
            mailer: MemoryMailer::new(),
            codes: Arc::new(SequenceCodes::default()),
            tokens: Arc::new(TokenService::new(&config)),
            config: Arc::new(config),
        }
    }

    async fn sign_up(&self, user_name: &str, email: &str) -> Result<(), AuthError> {
        SignUpUseCase::new(
            Arc::new(self.store.clone()),
            Arc::new(self.mailer.clone()),
            self.codes.clone(),
            self.config.clone(),
        )
        .execute(SignUpInput {
            user_name: user_name.to_string(),
            email: email.to_string(),
        })
        .await
        .map(|_| ())
    }

    async fn token(&self, user_name: &str, code: &str) -> Result<String, AuthError> {
        IssueTokenUseCase::new(
            Arc::new(self.store.clone()),
            self.tokens.clone(),
            self.config.clone(),
        )
        .execute(IssueTokenInput {
            user_name: user_name.to_string(),
            code: code.to_string(),
        })
        .await
        .map(|o| o.token)
    }

    /// Code from the latest mail sent to `email`
    fn mailed_code(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).expect("mail sent");
        mail.body.rsplit(' ').next().unwrap_or_default().to_string()
    }

    async fn actor(&self, user_name: &str, email: &str, role: UserRole) -> Actor {
        let mut user = User::new(UserName::new(user_name).unwrap(), Email::new(email).unwrap());
        user.set_role(role);
        self.store.put_user(user.clone()).await;
        Actor::Authenticated(Principal::from(&user))
    }

    fn router(&self) -> Router {
        let state = AuthAppState {
            repo: Arc::new(self.store.clone()),
            mailer: Arc::new(self.mailer.clone()),
            codes: self.codes.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        };
        auth_router(state).layer(axum::middleware::from_fn_with_state(
            self.tokens.clone(),
            resolve_actor,
        ))
    }
}

// ============================================================================
// Signup & Token
// ============================================================================

#[tokio::test]
async fn test_signup_mails_code_that_exchanges() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();

    let code = h.mailed_code("a@x.com");
    assert_eq!(code, "CODE01");

    let token = h.token("alice", &code).await.unwrap();
    let principal = h.tokens.verify(&token).unwrap();
    assert_eq!(principal.user_name, "alice");
    assert_eq!(principal.role, UserRole::User);
}

#[tokio::test]
async fn test_repeat_signup_replaces_code() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();
    let old = h.mailed_code("a@x.com");
    h.sign_up("alice", "a@x.com").await.unwrap();
    let new = h.mailed_code("a@x.com");

    assert_ne!(old, new);
    assert_eq!(h.store.user_count().await, 1);
    assert!(matches!(h.token("alice", &old).await, Err(AuthError::InvalidCode)));
    assert!(h.token("alice", &new).await.is_ok());
}

#[tokio::test]
async fn test_signup_conflicts_across_identities() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();

    assert!(matches!(
        h.sign_up("alice", "other@x.com").await,
        Err(AuthError::UserNameTaken)
    ));
    assert!(matches!(
        h.sign_up("bob", "A@X.com").await,
        Err(AuthError::EmailTaken)
    ));
    assert_eq!(h.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_signup_rejects_reserved_name() {
    let h = Harness::new();
    let err = h.sign_up("me", "me@x.com").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(ref e) if e.field == "username"));
}

#[tokio::test]
async fn test_concurrent_signup_creates_one_user() {
    let h = Arc::new(Harness::new());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let h = h.clone();
            tokio::spawn(async move { h.sign_up("alice", "a@x.com").await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(h.store.user_count().await, 1);
    assert_eq!(h.mailer.sent().len(), 8);

    // only the last issued code is live
    let live = h.mailed_code("a@x.com");
    let stored = h
        .store
        .find_code(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.code, live);
}

#[tokio::test]
async fn test_mail_failure_fails_signup() {
    let h = Harness::new();
    h.mailer.set_failing(true);

    assert!(matches!(
        h.sign_up("alice", "a@x.com").await,
        Err(AuthError::MailDelivery(_))
    ));
    assert_eq!(h.store.user_count().await, 0);
}

#[tokio::test]
async fn test_unknown_user_distinct_from_invalid_code() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();

    assert!(matches!(h.token("nobody", "CODE01").await, Err(AuthError::UnknownUser)));
    assert!(matches!(h.token("alice", "WRONG1").await, Err(AuthError::InvalidCode)));
}

#[tokio::test]
async fn test_code_of_another_user_never_validates() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();
    h.sign_up("bob", "b@x.com").await.unwrap();

    let bobs = h.mailed_code("b@x.com");
    assert!(matches!(h.token("alice", &bobs).await, Err(AuthError::InvalidCode)));
}

#[tokio::test]
async fn test_code_reusable_by_default() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();
    let code = h.mailed_code("a@x.com");

    let first = h.token("alice", &code).await.unwrap();
    let second = h.token("alice", &code).await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_single_use_codes() {
    let h = Harness::with_config(AuthConfig {
        single_use_codes: true,
        ..AuthConfig::development()
    });
    h.sign_up("alice", "a@x.com").await.unwrap();
    let code = h.mailed_code("a@x.com");

    assert!(h.token("alice", &code).await.is_ok());
    assert!(matches!(h.token("alice", &code).await, Err(AuthError::InvalidCode)));
}

#[tokio::test]
async fn test_expired_code_rejected() {
    let h = Harness::with_config(AuthConfig {
        code_ttl: Duration::ZERO,
        ..AuthConfig::development()
    });
    h.sign_up("alice", "a@x.com").await.unwrap();
    let code = h.mailed_code("a@x.com");

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(matches!(h.token("alice", &code).await, Err(AuthError::InvalidCode)));
}

// ============================================================================
// Profile & Administration
// ============================================================================

#[tokio::test]
async fn test_role_self_protection() {
    let h = Harness::new();
    let alice = h.actor("alice", "a@x.com", UserRole::User).await;
    let profile = ProfileUseCase::new(Arc::new(h.store.clone()));

    let result = profile
        .update(
            &alice,
            UserChanges {
                role: Some("admin".to_string()),
                bio: Some("sneaky".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::ForbiddenFieldMutation("role"))));

    let stored = profile.get(&alice).await.unwrap();
    assert_eq!(stored.user_role, UserRole::User);
    assert_eq!(stored.bio, "");
}

#[tokio::test]
async fn test_admin_cannot_change_own_role_through_profile() {
    let h = Harness::new();
    let admin = h.actor("root", "r@x.com", UserRole::Admin).await;

    let result = ProfileUseCase::new(Arc::new(h.store.clone()))
        .update(
            &admin,
            UserChanges {
                role: Some("user".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::ForbiddenFieldMutation("role"))));
}

#[tokio::test]
async fn test_profile_requires_authentication() {
    let h = Harness::new();
    let result = ProfileUseCase::new(Arc::new(h.store.clone()))
        .get(&Actor::Anonymous)
        .await;
    assert!(matches!(result, Err(AuthError::Unauthenticated)));
}

#[tokio::test]
async fn test_user_administration_is_admin_only() {
    let h = Harness::new();
    let moderator = h.actor("mod", "m@x.com", UserRole::Moderator).await;
    let manage = ManageUsersUseCase::new(Arc::new(h.store.clone()));

    assert!(matches!(
        manage.list(&moderator, None).await,
        Err(AuthError::PermissionDenied)
    ));
    assert!(matches!(
        manage.list(&Actor::Anonymous, None).await,
        Err(AuthError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_admin_changes_role() {
    let h = Harness::new();
    let admin = h.actor("root", "r@x.com", UserRole::Admin).await;
    h.actor("alice", "a@x.com", UserRole::User).await;
    let manage = ManageUsersUseCase::new(Arc::new(h.store.clone()));

    let updated = manage
        .update(
            &admin,
            "alice",
            UserChanges {
                role: Some("moderator".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.user_role, UserRole::Moderator);

    let err = manage
        .update(
            &admin,
            "alice",
            UserChanges {
                user_name: Some("root".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNameTaken));
}

#[tokio::test]
async fn test_admin_delete_user() {
    let h = Harness::new();
    let admin = h.actor("root", "r@x.com", UserRole::Admin).await;
    h.actor("alice", "a@x.com", UserRole::User).await;
    let manage = ManageUsersUseCase::new(Arc::new(h.store.clone()));

    manage.delete(&admin, "alice").await.unwrap();
    assert!(matches!(
        manage.get(&admin, "alice").await,
        Err(AuthError::UserNotFound)
    ));
    assert!(
        h.store
            .find_by_user_name(&UserName::new("alice").unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

// ============================================================================
// HTTP
// ============================================================================

async fn send(router: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_http_signup_token_profile() {
    let h = Harness::new();

    let (status, body) = send(
        h.router(),
        post_json("/auth/signup", serde_json::json!({"username": "alice", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");

    let (status, body) = send(
        h.router(),
        post_json(
            "/auth/token",
            serde_json::json!({"username": "alice", "confirmation_code": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CODE");

    let code = h.mailed_code("a@x.com");
    let (status, body) = send(
        h.router(),
        post_json(
            "/auth/token",
            serde_json::json!({"username": "alice", "confirmation_code": code}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let req = Request::patch("/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"role":"admin"}"#))
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FORBIDDEN_FIELD_MUTATION");

    let req = Request::get("/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_http_duplicate_signup_is_bad_request() {
    let h = Harness::new();
    h.sign_up("alice", "a@x.com").await.unwrap();

    let (status, body) = send(
        h.router(),
        post_json("/auth/signup", serde_json::json!({"username": "alice", "email": "z@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_USERNAME");
    assert_eq!(body["fields"][0], "username");
}

#[tokio::test]
async fn test_http_malformed_bodies_are_validation_errors() {
    let h = Harness::new();

    let (status, body) = send(
        h.router(),
        post_json("/auth/signup", serde_json::json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fields"][0], "email");
    assert!(h.mailer.sent().is_empty());

    let (status, body) = send(
        h.router(),
        post_json("/auth/token", serde_json::json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0], "confirmation_code");

    let req = Request::post("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\":"))
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_http_null_role_is_refused() {
    let h = Harness::new();
    h.sign_up("bob", "b@x.com").await.unwrap();
    let token = h.token("bob", &h.mailed_code("b@x.com")).await.unwrap();

    let req = Request::patch("/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"bio":"hi","role":null}"#))
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FORBIDDEN_FIELD_MUTATION");

    let req = Request::get("/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(h.router(), req).await;
    assert_eq!(body["bio"], "");
}

#[tokio::test]
async fn test_http_unknown_user_status() {
    let h = Harness::new();
    let (status, _) = send(
        h.router(),
        post_json(
            "/auth/token",
            serde_json::json!({"username": "ghost", "confirmation_code": "CODE01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let concealed = Harness::with_config(AuthConfig {
        conceal_token_failures: true,
        ..AuthConfig::development()
    });
    let (status, body) = send(
        concealed.router(),
        post_json(
            "/auth/token",
            serde_json::json!({"username": "ghost", "confirmation_code": "CODE01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CODE");
}

#[tokio::test]
async fn test_http_bearer_handling() {
    let h = Harness::new();

    let anonymous = Request::get("/users/me").body(Body::empty()).unwrap();
    assert_eq!(send(h.router(), anonymous).await.0, StatusCode::UNAUTHORIZED);

    let malformed = Request::get("/users/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(h.router(), malformed).await.0, StatusCode::UNAUTHORIZED);

    let forged = Request::get("/users/me")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(h.router(), forged).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_http_admin_surface() {
    let h = Harness::new();
    let mut admin = User::new(UserName::new("root").unwrap(), Email::new("r@x.com").unwrap());
    admin.is_superuser = true;
    h.store.put_user(admin.clone()).await;
    let admin_token = h.tokens.issue(&admin).unwrap();

    let user = User::new(UserName::new("alice").unwrap(), Email::new("a@x.com").unwrap());
    h.store.put_user(user.clone()).await;
    let user_token = h.tokens.issue(&user).unwrap();

    let req = Request::get("/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", user_token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(h.router(), req).await.0, StatusCode::FORBIDDEN);

    let req = Request::post("/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"bob","email":"b@x.com","role":"moderator"}"#))
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "moderator");

    let req = Request::get("/users?search=BO")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let req = Request::delete("/users/bob")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(h.router(), req).await.0, StatusCode::NO_CONTENT);
}

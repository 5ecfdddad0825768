//! Access Tokens
//!
//! Access tokens are HS256-signed JWTs carrying the user's identity and role
//! as of issuance. A role change takes effect on the next issued token.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::policy::actor::Principal;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's UUID.
    pub sub: Uuid,
    pub username: String,
    /// Role code at issuance (`user`, `moderator`, `admin`).
    pub role: String,
    pub is_superuser: bool,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Issues and verifies access tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&config.token_secret),
            decoding: DecodingKey::from_secret(&config.token_secret),
            ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, user: &User) -> AuthResult<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: *user.user_id.as_uuid(),
            username: user.user_name.to_string(),
            role: user.user_role.code().to_string(),
            is_superuser: user.is_superuser,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {}", e)))
    }

    /// Check signature and expiry, and rebuild the principal
    pub fn verify(&self, token: &str) -> AuthResult<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;
        let claims = data.claims;

        let role = UserRole::from_code(&claims.role).map_err(|_| AuthError::InvalidToken)?;

        Ok(Principal {
            user_id: UserId::from_uuid(claims.sub),
            user_name: claims.username,
            role,
            is_superuser: claims.is_superuser,
        })
    }
}

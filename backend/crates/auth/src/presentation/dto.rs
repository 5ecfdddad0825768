//! Request/Response DTOs

use serde::{Deserialize, Deserializer, Serialize};

use crate::application::profile::UserChanges;
use crate::domain::entity::user::User;

/// Present-but-null becomes `Some(None)`, absent stays `None`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub username: String,
    pub email: String,
}

// ============================================================================
// Token
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.user_name.to_string(),
            email: user.email.to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            bio: user.bio.clone(),
            role: user.user_role.code().to_string(),
        }
    }
}

/// `PATCH /users/me`
///
/// `role` is accepted as any JSON value, `null` included, only so that its
/// presence can be detected and refused.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub role: Option<Option<serde_json::Value>>,
}

impl ProfilePatchRequest {
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            user_name: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role.map(|v| match v {
                Some(serde_json::Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => "null".to_string(),
            }),
        }
    }
}

/// `POST /users`
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// `PATCH /users/{username}`
#[derive(Debug, Default, Deserialize)]
pub struct AdminUserPatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl From<AdminUserPatchRequest> for UserChanges {
    fn from(req: AdminUserPatchRequest) -> Self {
        UserChanges {
            user_name: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
}

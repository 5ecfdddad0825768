//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldError;
use platform::mail::MailError;
use thiserror::Error;

use crate::domain::policy::permission::AccessDenied;
use crate::domain::value_object::user_name::UserNameError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// A field failed shape validation
    #[error("{0}")]
    Validation(#[from] FieldError),

    /// Role code outside {user, moderator, admin}
    #[error("Unknown role: {0}")]
    InvalidRole(String),

    /// User name is owned by a different identity
    #[error("User name already exists")]
    UserNameTaken,

    /// Email is owned by a different identity
    #[error("Email already exists")]
    EmailTaken,

    /// No live confirmation code matches
    #[error("Invalid confirmation code")]
    InvalidCode,

    /// Token exchange for a user name nobody owns
    #[error("Unknown user")]
    UnknownUser,

    /// Attempt to change a field outside the surface allowed to change it
    #[error("Field '{0}' cannot be changed here")]
    ForbiddenFieldMutation(&'static str),

    /// Caller is anonymous on an authenticated surface
    #[error("Authentication required")]
    Unauthenticated,

    /// Bearer token is malformed, expired or badly signed
    #[error("Invalid access token")]
    InvalidToken,

    /// Role/ownership check failed
    #[error("Permission denied")]
    PermissionDenied,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// The confirmation mail could not be handed to the transport
    #[error("Mail delivery failed: {0}")]
    MailDelivery(#[from] MailError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidRole(_)
            | AuthError::UserNameTaken
            | AuthError::EmailTaken
            | AuthError::InvalidCode
            | AuthError::ForbiddenFieldMutation(_) => ErrorKind::BadRequest,
            AuthError::Unauthenticated | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::PermissionDenied => ErrorKind::Forbidden,
            AuthError::UnknownUser | AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::MailDelivery(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::InvalidRole(_) => "INVALID_ROLE",
            AuthError::UserNameTaken => "DUPLICATE_USERNAME",
            AuthError::EmailTaken => "DUPLICATE_EMAIL",
            AuthError::InvalidCode => "INVALID_CODE",
            AuthError::UnknownUser => "UNKNOWN_USER",
            AuthError::ForbiddenFieldMutation(_) => "FORBIDDEN_FIELD_MUTATION",
            AuthError::Unauthenticated => "NOT_AUTHENTICATED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::PermissionDenied => "PERMISSION_DENIED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::MailDelivery(_) => "MAIL_UNAVAILABLE",
            AuthError::Database(_) | AuthError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures keep their details out of the response body.
    pub fn to_app_error(&self) -> AppError {
        let message = if self.kind().is_server_error() {
            self.kind().as_str().to_string()
        } else {
            self.to_string()
        };
        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            AuthError::Validation(e) => err.with_field(e.field),
            AuthError::InvalidRole(_) => err.with_field("role"),
            AuthError::UserNameTaken => err.with_field("username"),
            AuthError::EmailTaken => err.with_field("email"),
            AuthError::InvalidCode => err.with_field("confirmation_code"),
            AuthError::ForbiddenFieldMutation(field) => err.with_field(*field),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::MailDelivery(e) => {
                tracing::error!(error = %e, "Confirmation mail not delivered");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected bearer token");
            }
            AuthError::ForbiddenFieldMutation(field) => {
                tracing::warn!(field = %field, "Forbidden field mutation attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AccessDenied> for AuthError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => AuthError::Unauthenticated,
            AccessDenied::Forbidden => AuthError::PermissionDenied,
        }
    }
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.into())
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

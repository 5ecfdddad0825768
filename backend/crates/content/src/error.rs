//! Content Error Types
//!
//! Content-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::policy::AccessDenied;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldError;
use thiserror::Error;

/// Content-specific result type alias
pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    /// A field failed shape validation
    #[error("{0}")]
    Validation(#[from] FieldError),

    #[error("Score must be between 1 and 10, got {0}")]
    ScoreOutOfRange(i64),

    #[error("Year {0} is in the future")]
    YearInFuture(i32),

    /// Slug given for a title does not name a category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Slug given for a title does not name a genre
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    /// The author already reviewed this title
    #[error("You have already reviewed this title")]
    DuplicateReview,

    #[error("Slug already exists")]
    DuplicateSlug,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Title not found")]
    TitleNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Genre not found")]
    GenreNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::Validation(_)
            | ContentError::ScoreOutOfRange(_)
            | ContentError::YearInFuture(_)
            | ContentError::UnknownCategory(_)
            | ContentError::UnknownGenre(_)
            | ContentError::DuplicateReview
            | ContentError::DuplicateSlug => ErrorKind::BadRequest,
            ContentError::Unauthenticated => ErrorKind::Unauthorized,
            ContentError::PermissionDenied => ErrorKind::Forbidden,
            ContentError::TitleNotFound
            | ContentError::ReviewNotFound
            | ContentError::CommentNotFound
            | ContentError::CategoryNotFound
            | ContentError::GenreNotFound => ErrorKind::NotFound,
            ContentError::Database(_) | ContentError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::Validation(_) => "VALIDATION_ERROR",
            ContentError::ScoreOutOfRange(_) => "SCORE_OUT_OF_RANGE",
            ContentError::YearInFuture(_) => "YEAR_IN_FUTURE",
            ContentError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            ContentError::UnknownGenre(_) => "UNKNOWN_GENRE",
            ContentError::DuplicateReview => "DUPLICATE_REVIEW",
            ContentError::DuplicateSlug => "DUPLICATE_SLUG",
            ContentError::Unauthenticated => "NOT_AUTHENTICATED",
            ContentError::PermissionDenied => "PERMISSION_DENIED",
            ContentError::TitleNotFound => "TITLE_NOT_FOUND",
            ContentError::ReviewNotFound => "REVIEW_NOT_FOUND",
            ContentError::CommentNotFound => "COMMENT_NOT_FOUND",
            ContentError::CategoryNotFound => "CATEGORY_NOT_FOUND",
            ContentError::GenreNotFound => "GENRE_NOT_FOUND",
            ContentError::Database(_) | ContentError::Internal(_) => "INTERNAL",
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let message = if self.kind().is_server_error() {
            self.kind().as_str().to_string()
        } else {
            self.to_string()
        };
        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            ContentError::Validation(e) => err.with_field(e.field),
            ContentError::ScoreOutOfRange(_) => err.with_field("score"),
            ContentError::YearInFuture(_) => err.with_field("year"),
            ContentError::UnknownCategory(_) => err.with_field("category"),
            ContentError::UnknownGenre(_) => err.with_field("genre"),
            ContentError::DuplicateSlug => err.with_field("slug"),
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            ContentError::Database(e) => {
                tracing::error!(error = %e, "Content database error");
            }
            ContentError::Internal(msg) => {
                tracing::error!(message = %msg, "Content internal error");
            }
            ContentError::DuplicateReview => {
                tracing::info!("Duplicate review rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Content error");
            }
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AccessDenied> for ContentError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => ContentError::Unauthenticated,
            AccessDenied::Forbidden => ContentError::PermissionDenied,
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        err.to_app_error()
    }
}

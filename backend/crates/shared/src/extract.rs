//! Request extractors
//!
//! [`Json`] は `axum::Json` と同じ使い方で、拒否されたボディを
//! 400 `VALIDATION_ERROR` の [`AppError`] として返します。

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::app_error::AppError;

/// JSON body extractor/response whose rejection renders as an RFC 7807 body
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let err = AppError::bad_request(detail.clone()).with_code("VALIDATION_ERROR");
        match rejection {
            JsonRejection::JsonDataError(_) => match offending_field(&detail) {
                Some(field) => err.with_field(field.to_string()),
                None => err,
            },
            _ => err,
        }
    }
}

/// serde のエラーメッセージから原因となったトップレベルのフィールド名を取り出す
///
/// - `missing field `email``: 必須フィールドの欠落
/// - `score: invalid type: ...`: 型の不一致（パス付き）
fn offending_field(detail: &str) -> Option<&str> {
    if let Some((_, rest)) = detail.split_once("missing field `") {
        return rest.split('`').next().filter(|f| !f.is_empty());
    }
    let (_, rest) = detail.split_once("target type: ")?;
    let (path, _) = rest.split_once(": ")?;
    path.split(['.', '['])
        .next()
        .filter(|f| !f.is_empty() && !f.contains(char::is_whitespace))
}

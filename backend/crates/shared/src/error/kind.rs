//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps a failure onto an HTTP status.

use serde::Serialize;

/// エラー種別の列挙体
///
/// リクエスト単位で終端するエラーを HTTP ステータスに対応付けます。
/// 細かい区別（重複ユーザー名、重複レビューなど）は `AppError::code` で表現し、
/// ここではステータスの粒度だけを扱います。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Forbidden;
/// assert_eq!(kind.status_code(), 403);
/// assert_eq!(kind.as_str(), "Forbidden");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - 入力値の検証エラー、重複、禁止フィールドの変更
    BadRequest,
    /// 401 - 認証されていない、またはトークンが無効
    Unauthorized,
    /// 403 - ロール・所有者チェックに失敗
    Forbidden,
    /// 404 - 参照先のリソースが存在しない
    NotFound,
    /// 409 - ドメインの変換を経ずに残った制約違反
    Conflict,
    /// 500 - サーバー内部エラー
    InternalServerError,
    /// 503 - 外部協力者（DB・メール）が利用不可
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// HTTP の標準的な理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx系かどうか（ログに残すべきエラー）
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InternalServerError | ErrorKind::ServiceUnavailable
        )
    }

    /// 4xx系かどうか
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

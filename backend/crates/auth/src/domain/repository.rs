//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure layer.

use platform::mail::{Mailer, OutgoingMail};

use crate::domain::entity::{confirmation_code::ConfirmationCode, user::User};
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. Fails with `UserNameTaken` / `EmailTaken` on clashes.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Users ordered by user name, optionally filtered by a user name substring
    async fn search(&self, query: Option<&str>) -> AuthResult<Vec<User>>;

    /// Update user. Fails with `UserNameTaken` / `EmailTaken` on clashes.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete user. Authored content is kept with its author link cleared.
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// Outcome of an atomic signup
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// `false` when the (user name, email) pair already existed
    pub created: bool,
}

/// Confirmation code repository trait
#[trait_variant::make(ConfirmationCodeRepository: Send)]
pub trait LocalConfirmationCodeRepository {
    /// サインアップの原子的な単位
    ///
    /// 1. ユーザー名またはメールアドレスで既存ユーザーを検索（行ロック）
    /// 2. 完全一致なら再送、片方だけ一致なら競合エラー、なければ作成
    /// 3. ユーザー名をキーにコードを upsert
    /// 4. メール送信に成功した場合のみコミット
    ///
    /// どこで失敗しても何も永続化されない。
    async fn register_with_code<M: Mailer + Sync>(
        &self,
        candidate: &User,
        code: &ConfirmationCode,
        mail: &OutgoingMail,
        mailer: &M,
    ) -> AuthResult<Registration>;

    /// Live code for a user name
    async fn find_code(&self, user_name: &UserName) -> AuthResult<Option<ConfirmationCode>>;

    /// Delete the code if it is still `code`. Returns whether this call consumed it.
    async fn consume_code(&self, user_name: &UserName, code: &str) -> AuthResult<bool>;
}

/// Everything the identity handlers need from a store
pub trait IdentityStore:
    UserRepository + ConfirmationCodeRepository + Clone + Send + Sync + 'static
{
}

impl<T> IdentityStore for T where
    T: UserRepository + ConfirmationCodeRepository + Clone + Send + Sync + 'static
{
}

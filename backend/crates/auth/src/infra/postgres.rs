//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation;
use platform::mail::{Mailer, OutgoingMail};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    confirmation_code::ConfirmationCode,
    user::{SignupMatch, User},
};
use crate::domain::repository::{ConfirmationCodeRepository, Registration, UserRepository};
use crate::domain::value_object::{
    email::Email, person_name::PersonName, user_id::UserId, user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    user_name,
    email,
    first_name,
    last_name,
    bio,
    user_role,
    is_superuser,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Remove confirmation codes older than `ttl`
    pub async fn cleanup_expired_codes(&self, ttl: chrono::Duration) -> AuthResult<u64> {
        let cutoff = Utc::now()
            .checked_sub_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let deleted = sqlx::query("DELETE FROM confirmation_codes WHERE issued_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(codes_deleted = deleted, "Cleaned up expired confirmation codes");

        Ok(deleted)
    }

    /// Users owning `user_name` or `email`, locked until the transaction ends
    async fn lock_owners(
        tx: &mut Transaction<'_, Postgres>,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1 OR email = $2 FOR UPDATE"
        ))
        .bind(user_name.as_str())
        .bind(email.as_str())
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

/// Translate unique violations on `users` into domain conflicts
fn user_conflict(err: sqlx::Error) -> AuthError {
    match unique_violation(&err).as_deref() {
        Some("uq_users_user_name") => AuthError::UserNameTaken,
        Some("uq_users_email") => AuthError::EmailTaken,
        _ => AuthError::Database(err),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgIdentityRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        bind_user(sqlx::query(INSERT_USER), user)
            .execute(&self.pool)
            .await
            .map_err(user_conflict)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn search(&self, query: Option<&str>) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL OR strpos(lower(user_name), lower($1)) > 0
            ORDER BY user_name
            "#
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                email = $3,
                first_name = $4,
                last_name = $5,
                bio = $6,
                user_role = $7,
                is_superuser = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(&user.bio)
        .bind(user.user_role.id())
        .bind(user.is_superuser)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(user_conflict)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        // reviews.author_id / comments.author_id are ON DELETE SET NULL
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Confirmation Code Repository Implementation
// ============================================================================

impl ConfirmationCodeRepository for PgIdentityRepository {
    async fn register_with_code<M: Mailer + Sync>(
        &self,
        candidate: &User,
        code: &ConfirmationCode,
        mail: &OutgoingMail,
        mailer: &M,
    ) -> AuthResult<Registration> {
        let mut tx = self.pool.begin().await?;

        let owners = Self::lock_owners(&mut tx, &candidate.user_name, &candidate.email).await?;
        let (user, created) = match User::match_signup(&owners, &candidate.user_name, &candidate.email)? {
            SignupMatch::Existing(user) => (user, false),
            SignupMatch::Vacant => {
                let inserted = bind_user(
                    sqlx::query(&format!("{INSERT_USER} ON CONFLICT DO NOTHING")),
                    candidate,
                )
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if inserted == 1 {
                    (candidate.clone(), true)
                } else {
                    // lost the race to a concurrent signup; judge against what it wrote
                    let owners =
                        Self::lock_owners(&mut tx, &candidate.user_name, &candidate.email).await?;
                    match User::match_signup(&owners, &candidate.user_name, &candidate.email)? {
                        SignupMatch::Existing(user) => (user, false),
                        SignupMatch::Vacant => {
                            return Err(AuthError::Internal(
                                "conflicting user row vanished during signup".to_string(),
                            ));
                        }
                    }
                }
            }
        };

        sqlx::query(
            r#"
            INSERT INTO confirmation_codes (user_name, code, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_name) DO UPDATE SET
                code = EXCLUDED.code,
                issued_at = EXCLUDED.issued_at
            "#,
        )
        .bind(user.user_name.as_str())
        .bind(&code.code)
        .bind(code.issued_at)
        .execute(&mut *tx)
        .await?;

        // dropping `tx` on failure rolls back the user and the code
        mailer.send(mail).await?;

        tx.commit().await?;

        Ok(Registration { user, created })
    }

    async fn find_code(&self, user_name: &UserName) -> AuthResult<Option<ConfirmationCode>> {
        let row = sqlx::query_as::<_, CodeRow>(
            "SELECT user_name, code, issued_at FROM confirmation_codes WHERE user_name = $1",
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CodeRow::into_code))
    }

    async fn consume_code(&self, user_name: &UserName, code: &str) -> AuthResult<bool> {
        let consumed = sqlx::query_scalar::<_, String>(
            "DELETE FROM confirmation_codes WHERE user_name = $1 AND code = $2 RETURNING user_name",
        )
        .bind(user_name.as_str())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(consumed.is_some())
    }
}

// ============================================================================
// Row types
// ============================================================================

const INSERT_USER: &str = r#"
    INSERT INTO users (
        user_id,
        user_name,
        email,
        first_name,
        last_name,
        bio,
        user_role,
        is_superuser,
        created_at,
        updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

fn bind_user<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    user: &'q User,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(&user.bio)
        .bind(user.user_role.id())
        .bind(user.is_superuser)
        .bind(user.created_at)
        .bind(user.updated_at)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    first_name: String,
    last_name: String,
    bio: String,
    user_role: i16,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            first_name: PersonName::from_db(self.first_name),
            last_name: PersonName::from_db(self.last_name),
            bio: self.bio,
            user_role: UserRole::from_id(self.user_role)?,
            is_superuser: self.is_superuser,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CodeRow {
    user_name: String,
    code: String,
    issued_at: DateTime<Utc>,
}

impl CodeRow {
    fn into_code(self) -> ConfirmationCode {
        ConfirmationCode {
            user_name: UserName::from_db(self.user_name),
            code: self.code,
            issued_at: self.issued_at,
        }
    }
}

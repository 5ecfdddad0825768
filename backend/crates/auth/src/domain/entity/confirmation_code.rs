//! Confirmation Code Entity
//!
//! At most one live code per user name. A later signup for the same user
//! name replaces the stored code.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::user_name::UserName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationCode {
    pub user_name: UserName,
    pub code: String,
    /// Time of the latest issuance (replacement resets it)
    pub issued_at: DateTime<Utc>,
}

impl ConfirmationCode {
    pub fn new(user_name: UserName, code: String) -> Self {
        Self {
            user_name,
            code,
            issued_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.issued_at > ttl
    }

    /// 定数時間比較で提示されたコードを照合する
    pub fn matches(&self, presented: &str) -> bool {
        platform::crypto::constant_time_eq(self.code.as_bytes(), presented.as_bytes())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

/// Stored role of a user. Superuser is a separate flag, never a fourth role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Moderator = 1,
    Admin = 2,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Moderator => "moderator",
            Admin => "admin",
        }
    }

    pub fn from_id(id: i16) -> Result<Self, AuthError> {
        use UserRole::*;
        match id {
            0 => Ok(User),
            1 => Ok(Moderator),
            2 => Ok(Admin),
            _ => {
                tracing::error!(role_id = id, "Invalid UserRole id");
                Err(AuthError::InvalidRole(id.to_string()))
            }
        }
    }

    pub fn from_code(code: &str) -> Result<Self, AuthError> {
        use UserRole::*;
        match code {
            "user" => Ok(User),
            "moderator" => Ok(Moderator),
            "admin" => Ok(Admin),
            _ => Err(AuthError::InvalidRole(code.to_string())),
        }
    }
}

impl FromStr for UserRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0).unwrap(), UserRole::User);
        assert_eq!(UserRole::from_id(1).unwrap(), UserRole::Moderator);
        assert_eq!(UserRole::from_id(2).unwrap(), UserRole::Admin);
        assert!(matches!(UserRole::from_id(3), Err(AuthError::InvalidRole(_))));
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("user").unwrap(), UserRole::User);
        assert_eq!(UserRole::from_code("moderator").unwrap(), UserRole::Moderator);
        assert_eq!(UserRole::from_code("admin").unwrap(), UserRole::Admin);
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in ["Admin", "ADMIN", "super_admin", "админ", ""] {
            assert!(matches!(UserRole::from_code(code), Err(AuthError::InvalidRole(_))), "{code}");
        }
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Moderator).unwrap(), "\"moderator\"");
        assert!(serde_json::from_str::<UserRole>("\"superuser\"").is_err());
    }
}

//! User Entity
//!
//! Identity plus profile. Authentication is passwordless, so there is no
//! separate credential entity.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, person_name::PersonName, user_id::UserId, user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Unique handle
    pub user_name: UserName,
    /// Unique, lowercased
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub bio: String,
    pub user_role: UserRole,
    /// Escalation flag, counts as admin regardless of `user_role`
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of matching a signup request against the users that already own
/// the requested user name or email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupMatch {
    /// Same (user name, email) pair: resend
    Existing(User),
    /// Neither is taken: create
    Vacant,
}

impl User {
    /// Create a new user with the default role
    pub fn new(user_name: UserName, email: Email) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            first_name: PersonName::default(),
            last_name: PersonName::default(),
            bio: String::new(),
            user_role: UserRole::default(),
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update user role
    pub fn set_role(&mut self, role: UserRole) {
        self.user_role = role;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Decide how a signup for (`user_name`, `email`) relates to `owners`,
    /// the users holding either value.
    ///
    /// An exact pair means the rightful owner asked again.
    pub fn match_signup(owners: &[User], user_name: &UserName, email: &Email) -> AuthResult<SignupMatch> {
        if let Some(user) = owners
            .iter()
            .find(|u| &u.user_name == user_name && &u.email == email)
        {
            return Ok(SignupMatch::Existing(user.clone()));
        }
        if owners.iter().any(|u| &u.user_name == user_name) {
            return Err(AuthError::UserNameTaken);
        }
        if owners.iter().any(|u| &u.email == email) {
            return Err(AuthError::EmailTaken);
        }
        Ok(SignupMatch::Vacant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::new(UserName::new(name).unwrap(), Email::new(email).unwrap())
    }

    #[test]
    fn test_new_user_defaults() {
        let u = user("alice", "a@x.com");
        assert_eq!(u.user_role, UserRole::User);
        assert!(!u.is_superuser);
        assert!(u.first_name.is_empty());
    }

    #[test]
    fn test_match_signup_exact_pair() {
        let alice = user("alice", "a@x.com");
        let result = User::match_signup(
            std::slice::from_ref(&alice),
            &alice.user_name,
            &Email::new("A@X.com").unwrap(),
        )
        .unwrap();
        assert_eq!(result, SignupMatch::Existing(alice));
    }

    #[test]
    fn test_match_signup_conflicts() {
        let alice = user("alice", "a@x.com");
        let owners = [alice.clone()];

        let name_clash = User::match_signup(&owners, &alice.user_name, &Email::new("other@x.com").unwrap());
        assert!(matches!(name_clash, Err(AuthError::UserNameTaken)));

        let email_clash = User::match_signup(&owners, &UserName::new("bob").unwrap(), &alice.email);
        assert!(matches!(email_clash, Err(AuthError::EmailTaken)));
    }

    #[test]
    fn test_match_signup_vacant() {
        let result = User::match_signup(&[], &UserName::new("carol").unwrap(), &Email::new("c@x.com").unwrap());
        assert_eq!(result.unwrap(), SignupMatch::Vacant);
    }
}

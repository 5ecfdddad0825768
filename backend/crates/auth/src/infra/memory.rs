//! In-Memory Identity Store
//!
//! Used when no database is configured, and by tests. One async mutex guards
//! users and codes together, so every operation is serialized the way a
//! row-locking transaction would serialize conflicting writers.

use std::collections::HashMap;
use std::sync::Arc;

use platform::mail::{Mailer, OutgoingMail};
use tokio::sync::Mutex;

use crate::domain::entity::{
    confirmation_code::ConfirmationCode,
    user::{SignupMatch, User},
};
use crate::domain::repository::{ConfirmationCodeRepository, Registration, UserRepository};
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// keyed by user name
    codes: HashMap<String, ConfirmationCode>,
}

impl Tables {
    fn owners(&self, user: &User) -> Vec<User> {
        self.users
            .values()
            .filter(|u| u.user_name == user.user_name || u.email == user.email)
            .cloned()
            .collect()
    }

    /// Uniqueness of user name and email against every other user
    fn check_unique(&self, user: &User) -> AuthResult<()> {
        let mut others = self.users.values().filter(|u| u.user_id != user.user_id);
        if others.clone().any(|u| u.user_name == user.user_name) {
            return Err(AuthError::UserNameTaken);
        }
        if others.any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        Ok(())
    }
}

/// Shared in-memory identity store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user without any checks (seeding)
    pub async fn put_user(&self, user: User) {
        self.inner.lock().await.users.insert(user.user_id, user);
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.users.len()
    }
}

impl UserRepository for MemoryIdentityStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut tables = self.inner.lock().await;
        tables.check_unique(user)?;
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.inner.lock().await.users.get(user_id).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| &u.user_name == user_name)
            .cloned())
    }

    async fn search(&self, query: Option<&str>) -> AuthResult<Vec<User>> {
        let needle = query.map(str::to_lowercase);
        let tables = self.inner.lock().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| match &needle {
                Some(n) => u.user_name.as_str().to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.user_name.as_str().cmp(b.user_name.as_str()));
        Ok(users)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut tables = self.inner.lock().await;
        let Some(previous) = tables.users.get(&user.user_id).cloned() else {
            return Err(AuthError::UserNotFound);
        };
        tables.check_unique(user)?;

        // codes follow a renamed user
        if previous.user_name != user.user_name {
            if let Some(mut code) = tables.codes.remove(previous.user_name.as_str()) {
                code.user_name = user.user_name.clone();
                tables.codes.insert(user.user_name.to_string(), code);
            }
        }

        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let mut tables = self.inner.lock().await;
        let Some(user) = tables.users.remove(user_id) else {
            return Ok(false);
        };
        tables.codes.remove(user.user_name.as_str());
        Ok(true)
    }
}

impl ConfirmationCodeRepository for MemoryIdentityStore {
    async fn register_with_code<M: Mailer + Sync>(
        &self,
        candidate: &User,
        code: &ConfirmationCode,
        mail: &OutgoingMail,
        mailer: &M,
    ) -> AuthResult<Registration> {
        // held across the send so a racing signup waits for the outcome
        let mut tables = self.inner.lock().await;

        let owners = tables.owners(candidate);
        let (user, created) =
            match User::match_signup(&owners, &candidate.user_name, &candidate.email)? {
                SignupMatch::Existing(user) => (user, false),
                SignupMatch::Vacant => (candidate.clone(), true),
            };

        mailer.send(mail).await?;

        if created {
            tables.users.insert(user.user_id, user.clone());
        }
        let mut code = code.clone();
        code.user_name = user.user_name.clone();
        tables.codes.insert(user.user_name.to_string(), code);

        Ok(Registration { user, created })
    }

    async fn find_code(&self, user_name: &UserName) -> AuthResult<Option<ConfirmationCode>> {
        Ok(self.inner.lock().await.codes.get(user_name.as_str()).cloned())
    }

    async fn consume_code(&self, user_name: &UserName, code: &str) -> AuthResult<bool> {
        let mut tables = self.inner.lock().await;
        match tables.codes.get(user_name.as_str()) {
            Some(stored) if stored.matches(code) => {
                tables.codes.remove(user_name.as_str());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::email::Email;
    use platform::mail::MemoryMailer;

    fn user(name: &str, email: &str) -> User {
        User::new(UserName::new(name).unwrap(), Email::new(email).unwrap())
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Confirmation code".to_string(),
            body: "code".to_string(),
        }
    }

    async fn register(
        store: &MemoryIdentityStore,
        mailer: &MemoryMailer,
        name: &str,
        email: &str,
        code: &str,
    ) -> AuthResult<Registration> {
        let candidate = user(name, email);
        let code = ConfirmationCode::new(candidate.user_name.clone(), code.to_string());
        store
            .register_with_code(&candidate, &code, &mail(email), mailer)
            .await
    }

    #[tokio::test]
    async fn test_register_creates_then_resends() {
        let store = MemoryIdentityStore::new();
        let mailer = MemoryMailer::new();

        let first = register(&store, &mailer, "alice", "a@x.com", "AAAAAA").await.unwrap();
        assert!(first.created);
        let second = register(&store, &mailer, "alice", "a@x.com", "BBBBBB").await.unwrap();
        assert!(!second.created);
        assert_eq!(first.user.user_id, second.user.user_id);

        assert_eq!(store.user_count().await, 1);
        let code = store.find_code(&first.user.user_name).await.unwrap().unwrap();
        assert_eq!(code.code, "BBBBBB");
        assert_eq!(mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_register_conflicts() {
        let store = MemoryIdentityStore::new();
        let mailer = MemoryMailer::new();
        register(&store, &mailer, "alice", "a@x.com", "AAAAAA").await.unwrap();

        let name = register(&store, &mailer, "alice", "other@x.com", "CCCCCC").await;
        assert!(matches!(name, Err(AuthError::UserNameTaken)));
        let email = register(&store, &mailer, "bob", "a@x.com", "CCCCCC").await;
        assert!(matches!(email, Err(AuthError::EmailTaken)));
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_mail_failure_persists_nothing() {
        let store = MemoryIdentityStore::new();
        let mailer = MemoryMailer::failing();

        let result = register(&store, &mailer, "alice", "a@x.com", "AAAAAA").await;
        assert!(matches!(result, Err(AuthError::MailDelivery(_))));
        assert_eq!(store.user_count().await, 0);
        assert!(
            store
                .find_code(&UserName::new("alice").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_consume_code_once() {
        let store = MemoryIdentityStore::new();
        let mailer = MemoryMailer::new();
        let reg = register(&store, &mailer, "alice", "a@x.com", "AAAAAA").await.unwrap();

        assert!(!store.consume_code(&reg.user.user_name, "ZZZZZZ").await.unwrap());
        assert!(store.consume_code(&reg.user.user_name, "AAAAAA").await.unwrap());
        assert!(!store.consume_code(&reg.user.user_name, "AAAAAA").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_enforces_uniqueness() {
        let store = MemoryIdentityStore::new();
        let alice = user("alice", "a@x.com");
        let bob = user("bob", "b@x.com");
        store.create(&alice).await.unwrap();
        store.create(&bob).await.unwrap();

        let mut renamed = bob.clone();
        renamed.user_name = alice.user_name.clone();
        assert!(matches!(store.update(&renamed).await, Err(AuthError::UserNameTaken)));

        let mut rebadged = bob.clone();
        rebadged.email = alice.email.clone();
        assert!(matches!(store.update(&rebadged).await, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_search_and_delete() {
        let store = MemoryIdentityStore::new();
        let alice = user("alice", "a@x.com");
        store.create(&alice).await.unwrap();
        store.create(&user("Alicia", "c@x.com")).await.unwrap();
        store.create(&user("bob", "b@x.com")).await.unwrap();

        let found = store.search(Some("ALI")).await.unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.user_name.as_str()).collect();
        assert_eq!(names, vec!["Alicia", "alice"]);

        assert!(store.delete(&alice.user_id).await.unwrap());
        assert!(!store.delete(&alice.user_id).await.unwrap());
        assert_eq!(store.search(None).await.unwrap().len(), 2);
    }
}

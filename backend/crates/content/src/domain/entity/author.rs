use auth::policy::Principal;
use kernel::id::UserId;

/// Who wrote a review or comment. Absent once the user is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<&Principal> for Author {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id,
            user_name: principal.user_name.clone(),
        }
    }
}

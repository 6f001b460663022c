//! User directory: login checks and the requester's leaderboard context.

use async_trait::async_trait;

use crate::domain::{privileges, PrivilegeTier};
use crate::errors::domain::DomainError;

/// The user asking for a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub username: String,
    pub privileges: u64,
    /// Two-letter country code, `XX` when unknown.
    pub country: String,
}

impl Requester {
    pub fn tier(&self) -> PrivilegeTier {
        PrivilegeTier::from_privileges(self.privileges)
    }

    /// Banned accounts lose the normal-user bit.
    pub fn is_banned(&self) -> bool {
        self.privileges & privileges::USER_NORMAL == 0
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Requester>, DomainError>;

    /// Check the client-supplied password hash for `user_id`.
    async fn verify_password(&self, user_id: i64, password_md5: &str) -> Result<bool, DomainError>;
}

//! SeaORM adapter for the user directory.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::warn;

use crate::entities::{users, users_stats};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::users::{Requester, UserDirectory};

const UNKNOWN_COUNTRY: &str = "XX";

/// Lowercased, trimmed, spaces as underscores.
pub fn safe_username(username: &str) -> String {
    username.trim().to_lowercase().replace(' ', "_")
}

pub async fn find_with_stats<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    username: &str,
) -> Result<Option<(users::Model, Option<users_stats::Model>)>, DbErr> {
    users::Entity::find()
        .filter(users::Column::UsernameSafe.eq(safe_username(username)))
        .find_also_related(users_stats::Entity)
        .one(conn)
        .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(user_id).one(conn).await
}

fn requester_from(user: users::Model, stats: Option<users_stats::Model>) -> Requester {
    let country = stats
        .map(|s| s.country)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());
    Requester {
        user_id: user.id,
        username: user.username,
        privileges: u64::try_from(user.privileges).unwrap_or(0),
        country,
    }
}

/// `UserDirectory` over the `users` tables. Passwords are bcrypt hashes of
/// the md5 the client sends.
#[derive(Clone)]
pub struct SeaUserDirectory {
    db: DatabaseConnection,
}

impl SeaUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SeaUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Requester>, DomainError> {
        let found = find_with_stats(&self.db, username).await?;
        Ok(found.map(|(user, stats)| requester_from(user, stats)))
    }

    async fn verify_password(&self, user_id: i64, password_md5: &str) -> Result<bool, DomainError> {
        let Some(user) = find_by_id(&self.db, user_id).await? else {
            return Ok(false);
        };
        let password = password_md5.to_string();
        let hash = user.password_md5;

        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                DomainError::infra(InfraErrorKind::Other("Join".into()), e.to_string())
            })?;

        match verified {
            Ok(ok) => Ok(ok),
            Err(e) => {
                warn!(user_id, error = %e, "stored password hash is not valid bcrypt");
                Ok(false)
            }
        }
    }
}

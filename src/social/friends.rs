use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::User, error::AppError};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Friend {
    pub id: Uuid,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub since: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum FriendError {
    #[error("User not found")]
    UnknownUser,
    #[error("You cannot add yourself")]
    SelfFriend,
    #[error("Friend limit reached")]
    TooMany,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for FriendError {
    fn from(e: sqlx::Error) -> Self {
        FriendError::Other(e.into())
    }
}

impl From<FriendError> for AppError {
    fn from(e: FriendError) -> Self {
        match e {
            FriendError::UnknownUser => AppError::NotFound(e.to_string()),
            FriendError::SelfFriend => AppError::BadRequest(e.to_string()),
            FriendError::TooMany => AppError::Conflict(e.to_string()),
            FriendError::Other(e) => AppError::Internal(e),
        }
    }
}

pub async fn list(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<Friend>> {
    let rows = sqlx::query_as::<_, Friend>(
        r#"
        SELECT u.id, u.username, f.created_at AS since
        FROM friendships f
        JOIN users u ON u.id = f.friend_id
        WHERE f.user_id = ?
        ORDER BY u.username
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// One-directional and idempotent: adding an existing friend succeeds
/// without counting against the limit.
pub async fn add(
    db: &SqlitePool,
    user_id: Uuid,
    username: &str,
    max_friends: i64,
) -> Result<Friend, FriendError> {
    let friend = User::find_by_username(db, username.trim())
        .await?
        .ok_or(FriendError::UnknownUser)?;
    if friend.id == user_id {
        return Err(FriendError::SelfFriend);
    }

    let current = list(db, user_id).await?;
    if let Some(existing) = current.iter().find(|f| f.id == friend.id) {
        return Ok(existing.clone());
    }
    if current.len() as i64 >= max_friends {
        return Err(FriendError::TooMany);
    }

    let now = OffsetDateTime::now_utc();
    sqlx::query("INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(friend.id)
        .bind(now)
        .execute(db)
        .await?;
    Ok(Friend {
        id: friend.id,
        username: friend.username,
        since: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo::test_user, state::AppState};

    #[tokio::test]
    async fn add_by_username() {
        let state = AppState::fake().await;
        let me = test_user(&state.db, "genti").await;
        test_user(&state.db, "hana").await;

        let f = add(&state.db, me, "hana", 3).await.unwrap();
        assert_eq!(f.username, "hana");
        // second add is a no-op
        add(&state.db, me, " hana ", 3).await.unwrap();
        assert_eq!(list(&state.db, me).await.unwrap().len(), 1);

        assert!(matches!(add(&state.db, me, "genti", 3).await, Err(FriendError::SelfFriend)));
        assert!(matches!(add(&state.db, me, "askush", 3).await, Err(FriendError::UnknownUser)));
    }

    #[tokio::test]
    async fn limit_applies_to_new_friends() {
        let state = AppState::fake().await;
        let me = test_user(&state.db, "ilir").await;
        test_user(&state.db, "jeta").await;
        test_user(&state.db, "kreshnik").await;

        add(&state.db, me, "jeta", 1).await.unwrap();
        assert!(matches!(add(&state.db, me, "kreshnik", 1).await, Err(FriendError::TooMany)));
        add(&state.db, me, "jeta", 1).await.unwrap();
    }
}

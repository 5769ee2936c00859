use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{types::Json, FromRow, SqlitePool};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub rewards: Json<Value>,
    pub participants: i64,
}

#[derive(Debug, Serialize)]
pub struct JoinedChallenge {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

#[derive(FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    challenge: Challenge,
    completed: bool,
    joined_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("Challenge not found")]
    NotFound,
    #[error("Already joined this challenge")]
    AlreadyJoined,
    #[error("Challenge is full")]
    Full,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<JoinError> for AppError {
    fn from(e: JoinError) -> Self {
        match e {
            JoinError::NotFound => AppError::NotFound(e.to_string()),
            JoinError::AlreadyJoined | JoinError::Full => AppError::Conflict(e.to_string()),
            JoinError::Db(e) => AppError::from(e),
        }
    }
}

const SELECT_CHALLENGE: &str = r#"
    SELECT c.id, c.name, c.description, c.start_date, c.end_date, c.rewards,
           (SELECT COUNT(*) FROM user_challenges uc WHERE uc.challenge_id = c.id) AS participants
    FROM community_challenges c
"#;

/// Active and not yet ended, soonest ending first.
pub async fn list_active(db: &SqlitePool) -> anyhow::Result<Vec<Challenge>> {
    let sql = format!("{SELECT_CHALLENGE} WHERE c.is_active = 1 AND c.end_date > ? ORDER BY c.end_date");
    let rows = sqlx::query_as::<_, Challenge>(&sql)
        .bind(OffsetDateTime::now_utc())
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Seeds a seven-day challenge when none is running. Returns the new
/// challenge, if one was created.
pub async fn ensure_weekly_challenge(db: &SqlitePool) -> anyhow::Result<Option<Challenge>> {
    if !list_active(db).await?.is_empty() {
        return Ok(None);
    }
    let now = OffsetDateTime::now_utc();
    let id = format!("javore-{}", now.date());
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO community_challenges
            (id, name, description, start_date, end_date, rewards, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(&id)
    .bind("Sfida 7-ditore e ushqimit të shëndetshëm")
    .bind("Planifikoni dhe ndiqni vaktet tuaja çdo ditë për një javë.")
    .bind(now)
    .bind(now + Duration::days(7))
    .bind(Json(json!({ "achievement": "first_week", "points": 100 })))
    .bind(now)
    .execute(db)
    .await?;
    tracing::info!(challenge_id = %id, "weekly challenge seeded");
    Ok(list_active(db).await?.into_iter().find(|c| c.id == id))
}

/// Joins once. The insert runs first so the transaction holds the write
/// lock before the cap is counted; concurrent joins wait on the busy timeout
/// and an insert over the cap is rolled back.
pub async fn join(
    db: &SqlitePool,
    user_id: Uuid,
    challenge_id: &str,
    max_participants: i64,
) -> Result<Challenge, JoinError> {
    let now = OffsetDateTime::now_utc();
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_challenges (user_id, challenge_id, progress, completed, joined_at)
        SELECT ?, c.id, '{}', 0, ?
        FROM community_challenges c
        WHERE c.id = ? AND c.is_active = 1 AND c.end_date > ?
        ON CONFLICT (user_id, challenge_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(challenge_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let sql = format!("{SELECT_CHALLENGE} WHERE c.id = ? AND c.is_active = 1 AND c.end_date > ?");
    let challenge = sqlx::query_as::<_, Challenge>(&sql)
        .bind(challenge_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(JoinError::NotFound)?;

    if inserted == 0 {
        return Err(JoinError::AlreadyJoined);
    }
    if challenge.participants > max_participants {
        return Err(JoinError::Full);
    }
    tx.commit().await?;
    Ok(challenge)
}

pub async fn mine(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<JoinedChallenge>> {
    let rows = sqlx::query_as::<_, JoinedRow>(
        r#"
        SELECT c.id, c.name, c.description, c.start_date, c.end_date, c.rewards,
               (SELECT COUNT(*) FROM user_challenges x WHERE x.challenge_id = c.id) AS participants,
               uc.completed, uc.joined_at
        FROM community_challenges c
        JOIN user_challenges uc ON uc.challenge_id = c.id
        WHERE uc.user_id = ?
        ORDER BY uc.joined_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| JoinedChallenge {
            challenge: r.challenge,
            completed: r.completed,
            joined_at: r.joined_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo::test_user, state::AppState};

    #[tokio::test]
    async fn seeding_happens_once() {
        let state = AppState::fake().await;
        let seeded = ensure_weekly_challenge(&state.db).await.unwrap();
        assert!(seeded.is_some());
        assert!(ensure_weekly_challenge(&state.db).await.unwrap().is_none());
        assert_eq!(list_active(&state.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn join_is_once_and_capped() {
        let state = AppState::fake().await;
        let id = ensure_weekly_challenge(&state.db).await.unwrap().unwrap().id;
        let a = test_user(&state.db, "alba").await;
        let b = test_user(&state.db, "blerta").await;
        let c = test_user(&state.db, "celi").await;

        let joined = join(&state.db, a, &id, 2).await.unwrap();
        assert_eq!(joined.participants, 1);
        assert!(matches!(join(&state.db, a, &id, 2).await, Err(JoinError::AlreadyJoined)));
        join(&state.db, b, &id, 2).await.unwrap();
        assert!(matches!(join(&state.db, c, &id, 2).await, Err(JoinError::Full)));
        assert!(matches!(join(&state.db, c, "nope", 2).await, Err(JoinError::NotFound)));

        let mine = mine(&state.db, a).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].challenge.participants, 2);
        assert!(!mine[0].completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_joins_respect_the_cap() {
        let path = std::env::temp_dir().join(format!("asistenti-{}.db", Uuid::new_v4()));
        let db = crate::db::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        crate::db::migrate(&db).await.unwrap();
        let id = ensure_weekly_challenge(&db).await.unwrap().unwrap().id;
        let a = test_user(&db, "dea").await;
        let b = test_user(&db, "erion").await;

        let (first, second) = tokio::join!(join(&db, a, &id, 1), join(&db, b, &id, 1));
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results.iter().filter(|r| matches!(r, Err(JoinError::Full))).count(),
            1
        );
        assert_eq!(list_active(&db).await.unwrap()[0].participants, 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}

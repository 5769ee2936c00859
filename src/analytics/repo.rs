use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::{types::Json, SqlitePool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub async fn log_event(
    db: &SqlitePool,
    user_id: Option<Uuid>,
    event_type: &str,
    data: Value,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events (id, user_id, event_type, event_data, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(event_type)
    .bind(Json(data))
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(())
}

/// Like [`log_event`], but a failure only logs: analytics never fails a
/// request.
pub async fn record(db: &SqlitePool, user_id: Option<Uuid>, event_type: &str, data: Value) {
    if let Err(e) = log_event(db, user_id, event_type, data).await {
        tracing::warn!(error = %e, event_type, "analytics event dropped");
    }
}

/// Event type to count over the last `days` days.
pub async fn counts_since(
    db: &SqlitePool,
    user_id: Uuid,
    days: i64,
) -> anyhow::Result<BTreeMap<String, i64>> {
    let since = OffsetDateTime::now_utc() - Duration::days(days);
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT event_type, COUNT(*)
        FROM analytics_events
        WHERE user_id = ? AND created_at >= ?
        GROUP BY event_type
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}

pub async fn count_event(db: &SqlitePool, user_id: Uuid, event_type: &str) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM analytics_events WHERE user_id = ? AND event_type = ?",
    )
    .bind(user_id)
    .bind(event_type)
    .fetch_one(db)
    .await?;
    Ok(n)
}

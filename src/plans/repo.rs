use sqlx::{types::Json, FromRow, SqlitePool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::dto::{PlanDocument, PlanSummary};

#[derive(Debug, Clone, FromRow)]
pub struct StoredPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: Json<PlanDocument>,
    pub week_start: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl StoredPlan {
    pub fn summary(&self) -> PlanSummary {
        let doc = &self.plan.0;
        PlanSummary {
            id: self.id,
            week_start: self.week_start,
            created_at: self.created_at,
            goal: doc.goal,
            kcal: doc.objective.kcal,
            with_supplements: doc.with_supplements,
            empty_slots: doc.week.empty_slots(),
        }
    }
}

/// Midnight (UTC) of the Monday of the week containing `at`.
pub fn week_start(at: OffsetDateTime) -> OffsetDateTime {
    let date = at.date() - Duration::days(at.weekday().number_days_from_monday() as i64);
    date.midnight().assume_utc()
}

pub async fn insert(db: &SqlitePool, user_id: Uuid, doc: &PlanDocument) -> anyhow::Result<StoredPlan> {
    let now = OffsetDateTime::now_utc();
    let plan = sqlx::query_as::<_, StoredPlan>(
        r#"
        INSERT INTO meal_plans (id, user_id, plan, week_start, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, user_id, plan, week_start, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(Json(doc))
    .bind(week_start(now))
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(plan)
}

/// Newest first.
pub async fn list_recent(db: &SqlitePool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<StoredPlan>> {
    let rows = sqlx::query_as::<_, StoredPlan>(
        r#"
        SELECT id, user_id, plan, week_start, created_at
        FROM meal_plans
        WHERE user_id = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn latest(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
    Ok(list_recent(db, user_id, 1).await?.into_iter().next())
}

pub async fn get(db: &SqlitePool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<StoredPlan>> {
    let row = sqlx::query_as::<_, StoredPlan>(
        r#"
        SELECT id, user_id, plan, week_start, created_at
        FROM meal_plans
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn count(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM meal_plans WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(n)
}

/// Plan creation times, oldest first.
pub async fn plan_dates(db: &SqlitePool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<OffsetDateTime>> {
    let rows: Vec<(OffsetDateTime,)> = sqlx::query_as(
        r#"
        SELECT created_at FROM (
            SELECT created_at FROM meal_plans
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
        )
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn week_start_is_monday_midnight() {
        let thu = datetime!(2025-01-09 15:30 UTC);
        assert_eq!(week_start(thu), datetime!(2025-01-06 0:00 UTC));
        let mon = datetime!(2025-01-06 0:00 UTC);
        assert_eq!(week_start(mon), mon);
        let sun = datetime!(2025-01-12 23:59 UTC);
        assert_eq!(week_start(sun), datetime!(2025-01-06 0:00 UTC));
    }
}

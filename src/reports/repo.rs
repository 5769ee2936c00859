use sqlx::{types::Json, FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::generator::{GoalsMet, ReportDraft};

#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct NutritionReport {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub week_start: OffsetDateTime,
    pub total_calories: i64,
    pub avg_daily_calories: i64,
    pub protein_avg: f64,
    pub carbs_avg: f64,
    pub fat_avg: f64,
    pub weight_change: f64,
    pub goals_met: Json<GoalsMet>,
    pub recommendations: Json<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl NutritionReport {
    /// Share of goals met, `None` when the report checked nothing.
    pub fn goal_ratio(&self) -> Option<f64> {
        let total = self.goals_met.0.len();
        (total > 0).then(|| {
            self.goals_met.0.values().filter(|g| g.met).count() as f64 / total as f64
        })
    }
}

pub async fn insert(
    db: &SqlitePool,
    user_id: Uuid,
    week_start: OffsetDateTime,
    draft: &ReportDraft,
) -> anyhow::Result<NutritionReport> {
    let report = sqlx::query_as::<_, NutritionReport>(
        r#"
        INSERT INTO nutrition_reports
            (id, user_id, week_start, total_calories, avg_daily_calories,
             protein_avg, carbs_avg, fat_avg, weight_change, goals_met,
             recommendations, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
        RETURNING id, user_id, week_start, total_calories, avg_daily_calories,
                  protein_avg, carbs_avg, fat_avg, weight_change, goals_met,
                  recommendations, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(week_start)
    .bind(draft.total_calories as i64)
    .bind(draft.avg_daily_calories as i64)
    .bind(draft.protein_avg)
    .bind(draft.carbs_avg)
    .bind(draft.fat_avg)
    .bind(Json(&draft.goals_met))
    .bind(Json(&draft.recommendations))
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(report)
}

/// Newest first.
pub async fn list(db: &SqlitePool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<NutritionReport>> {
    let rows = sqlx::query_as::<_, NutritionReport>(
        r#"
        SELECT id, user_id, week_start, total_calories, avg_daily_calories,
               protein_avg, carbs_avg, fat_avg, weight_change, goals_met,
               recommendations, created_at
        FROM nutrition_reports
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

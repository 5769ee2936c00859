use serde::Serialize;
use sqlx::{types::Json, FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::MealSlot;

#[derive(Debug, Clone, FromRow)]
pub struct RecognitionLog {
    pub id: Uuid,
    pub image_key: Option<String>,
    pub recognized_foods: Json<Vec<String>>,
    pub confidence_scores: Json<Vec<f64>>,
    pub meal_type: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub foods: Vec<String>,
    pub confidence_scores: Vec<f64>,
    pub meal_type: Option<String>,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert_log(
    db: &SqlitePool,
    user_id: Uuid,
    image_key: Option<&str>,
    foods: &[String],
    confidences: &[f64],
    meal_type: Option<MealSlot>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO food_recognition_logs
            (id, user_id, image_key, recognized_foods, confidence_scores, meal_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(image_key)
    .bind(Json(foods))
    .bind(Json(confidences))
    .bind(meal_type.map(MealSlot::as_str))
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(id)
}

/// Newest first.
pub async fn history(db: &SqlitePool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<RecognitionLog>> {
    let rows = sqlx::query_as::<_, RecognitionLog>(
        r#"
        SELECT id, image_key, recognized_foods, confidence_scores, meal_type, created_at
        FROM food_recognition_logs
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

/// Object keys of every archived photo of the user.
pub async fn image_keys(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT image_key FROM food_recognition_logs WHERE user_id = ? AND image_key IS NOT NULL",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(k,)| k).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo::test_user, state::AppState};

    #[tokio::test]
    async fn logs_and_keys() {
        let state = AppState::fake().await;
        let user = test_user(&state.db, "lule").await;

        insert_log(&state.db, user, Some("food/a.png"), &["rice".into()], &[90.0], Some(MealSlot::Lunch))
            .await
            .unwrap();
        insert_log(&state.db, user, None, &["eggs".into()], &[70.0], None)
            .await
            .unwrap();

        let logs = history(&state.db, user, 20).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(image_keys(&state.db, user).await.unwrap(), vec!["food/a.png".to_string()]);
    }
}

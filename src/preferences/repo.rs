use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::learning::{PreferenceMap, PreferenceStat};
use crate::nutrition::MealSlot;

#[derive(Debug, FromRow)]
struct AggregateRow {
    food_item: String,
    avg_rating: f64,
    count: i64,
}

pub async fn insert_rating(
    db: &SqlitePool,
    user_id: Uuid,
    food_item: &str,
    rating: u8,
    meal_type: Option<MealSlot>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO food_ratings (id, user_id, food_item, rating, meal_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(food_item)
    .bind(rating as i64)
    .bind(meal_type.map(MealSlot::as_str))
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(())
}

/// Average rating and count per rated item.
pub async fn preferences(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<PreferenceMap> {
    let rows = sqlx::query_as::<_, AggregateRow>(
        r#"
        SELECT food_item, AVG(rating) AS avg_rating, COUNT(*) AS count
        FROM food_ratings
        WHERE user_id = ?
        GROUP BY food_item
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.food_item,
                PreferenceStat {
                    avg_rating: r.avg_rating,
                    count: r.count,
                },
            )
        })
        .collect())
}

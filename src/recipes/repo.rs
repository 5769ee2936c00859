use sqlx::{types::Json, FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::Recipe;
use crate::nutrition::MealSlot;

#[derive(Debug, FromRow)]
struct RecipeRow {
    name: String,
    meal_type: String,
    kcal: i64,
    protein: f64,
    carbs: f64,
    fat: f64,
    tags: Json<Vec<String>>,
    ingredients: Json<Vec<String>>,
    steps: Json<Vec<String>>,
}

impl RecipeRow {
    fn into_recipe(self) -> Option<Recipe> {
        let meal_type = self.meal_type.parse::<MealSlot>().ok()?;
        Some(Recipe {
            name: self.name,
            meal_type,
            kcal: u32::try_from(self.kcal).unwrap_or(0),
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            tags: self.tags.0,
            ingredients: self.ingredients.0,
            steps: self.steps.0,
            supplements: Vec::new(),
            skill_notes: None,
        })
    }
}

/// Generated recipes persisted from earlier plans.
pub async fn list_generated(db: &SqlitePool) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT name, meal_type, kcal, protein, carbs, fat, tags, ingredients, steps
        FROM recipes
        ORDER BY created_at
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().filter_map(RecipeRow::into_recipe).collect())
}

/// Returns false when a recipe with the same name and meal type exists.
pub async fn save_generated(db: &SqlitePool, recipe: &Recipe) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT OR IGNORE INTO recipes
            (id, name, meal_type, kcal, protein, carbs, fat, tags, ingredients, steps, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(recipe.name.trim())
    .bind(recipe.meal_type.as_str())
    .bind(recipe.kcal as i64)
    .bind(recipe.protein)
    .bind(recipe.carbs)
    .bind(recipe.fat)
    .bind(Json(&recipe.tags))
    .bind(Json(&recipe.ingredients))
    .bind(Json(&recipe.steps))
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(res.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{recipes::model::sample, state::AppState};

    #[tokio::test]
    async fn generated_recipes_are_deduplicated() {
        let state = AppState::fake().await;
        let r = sample("Qofte AI", MealSlot::Dinner, 650, &["AI"], &["300 g mish"]);
        assert!(save_generated(&state.db, &r).await.unwrap());

        let mut again = r.clone();
        again.name = "QOFTE AI".into();
        assert!(!save_generated(&state.db, &again).await.unwrap());

        let stored = list_generated(&state.db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Qofte AI");
        assert_eq!(stored[0].ingredients, vec!["300 g mish".to_string()]);
    }
}

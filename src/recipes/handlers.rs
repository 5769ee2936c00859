use std::collections::BTreeSet;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{recipe_book, Recipe};
use crate::{error::AppResult, nutrition::MealSlot, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub meal_type: Option<MealSlot>,
    pub tag: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/tags", get(list_tags))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(q): Query<RecipeQuery>,
) -> AppResult<Json<Vec<Recipe>>> {
    let recipes = recipe_book(&state)
        .await?
        .into_iter()
        .filter(|r| q.meal_type.map_or(true, |slot| r.meal_type == slot))
        .filter(|r| q.tag.as_deref().map_or(true, |t| r.has_tag(t)))
        .collect();
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let tags: BTreeSet<String> = recipe_book(&state)
        .await?
        .into_iter()
        .flat_map(|r| r.tags)
        .collect();
    Ok(Json(tags.into_iter().collect()))
}

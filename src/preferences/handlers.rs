use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    learning::{insights, rank_recipes, PreferenceInsights},
    repo,
};
use crate::{
    analytics,
    auth::{current_user, AuthUser},
    error::{AppError, AppResult},
    nutrition::MealSlot,
    recipes::{recipe_book, Recipe},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub food_item: String,
    pub rating: u8,
    pub meal_type: Option<MealSlot>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub meal_type: Option<MealSlot>,
    pub limit: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(rate_food))
        .route("/ratings/insights", get(get_insights))
        .route("/ratings/recommendations", get(recommended_recipes))
}

#[instrument(skip(state, payload))]
pub async fn rate_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RateRequest>,
) -> AppResult<(StatusCode, Json<PreferenceInsights>)> {
    let food_item = payload.food_item.trim().to_lowercase();
    if food_item.is_empty() {
        return Err(AppError::bad_request("food_item is required"));
    }
    if !(1..=5).contains(&payload.rating) {
        warn!(rating = payload.rating, "rating out of range");
        return Err(AppError::bad_request("rating must be between 1 and 5"));
    }
    current_user(&state, user_id).await?;

    repo::insert_rating(&state.db, user_id, &food_item, payload.rating, payload.meal_type).await?;
    info!(%user_id, %food_item, rating = payload.rating, "food rated");
    analytics::record(
        &state.db,
        Some(user_id),
        "food_rating",
        json!({
            "food_item": food_item,
            "rating": payload.rating,
            "meal_type": payload.meal_type,
        }),
    )
    .await;

    let prefs = repo::preferences(&state.db, user_id).await?;
    Ok((StatusCode::CREATED, Json(insights(&prefs))))
}

#[instrument(skip(state))]
pub async fn get_insights(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PreferenceInsights>> {
    let prefs = repo::preferences(&state.db, user_id).await?;
    Ok(Json(insights(&prefs)))
}

#[instrument(skip(state))]
pub async fn recommended_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<Recipe>>> {
    let prefs = repo::preferences(&state.db, user_id).await?;
    let pool: Vec<Recipe> = recipe_book(&state)
        .await?
        .into_iter()
        .filter(|r| q.meal_type.map_or(true, |slot| r.meal_type == slot))
        .collect();
    let mut ranked = rank_recipes(pool, &prefs, q.meal_type);
    ranked.truncate(q.limit.unwrap_or(10).clamp(1, 50));
    Ok(Json(ranked))
}

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use super::{skill_recommendations, CookingSkill};
use crate::{
    analytics,
    auth::{current_user, AuthUser, User},
    error::AppResult,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SkillResponse {
    pub level: CookingSkill,
    pub recommendations: [&'static str; 5],
}

#[derive(Debug, Deserialize)]
pub struct SetSkillRequest {
    pub level: CookingSkill,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/skills", get(get_skill).put(set_skill))
}

#[instrument(skip(state))]
pub async fn get_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<SkillResponse>> {
    let level = current_user(&state, user_id).await?.skill();
    Ok(Json(SkillResponse {
        level,
        recommendations: skill_recommendations(level),
    }))
}

#[instrument(skip(state))]
pub async fn set_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetSkillRequest>,
) -> AppResult<Json<SkillResponse>> {
    current_user(&state, user_id).await?;
    User::set_skill(&state.db, user_id, payload.level).await?;
    info!(%user_id, level = %payload.level, "cooking skill updated");
    analytics::record(
        &state.db,
        Some(user_id),
        "skill_updated",
        json!({ "level": payload.level }),
    )
    .await;
    Ok(Json(SkillResponse {
        level: payload.level,
        recommendations: skill_recommendations(payload.level),
    }))
}

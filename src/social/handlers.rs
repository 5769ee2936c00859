use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{
    achievements::{self, EarnedAchievement},
    challenges::{self, Challenge, JoinedChallenge},
    friends::{self, Friend},
};
use crate::{
    analytics,
    auth::{current_user, AuthUser},
    error::AppResult,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    #[serde(default)]
    pub progress: Value,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub shared: bool,
    pub new_achievements: Vec<&'static str>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/achievements", get(list_achievements))
        .route("/challenges", get(list_challenges))
        .route("/challenges/mine", get(my_challenges))
        .route("/challenges/:id/join", post(join_challenge))
        .route("/friends", get(list_friends).post(add_friend))
        .route("/progress/share", post(share_progress))
}

#[instrument(skip(state))]
pub async fn list_achievements(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<EarnedAchievement>>> {
    Ok(Json(achievements::list(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn list_challenges(State(state): State<AppState>) -> AppResult<Json<Vec<Challenge>>> {
    Ok(Json(challenges::list_active(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn my_challenges(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<JoinedChallenge>>> {
    Ok(Json(challenges::mine(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn join_challenge(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Challenge>)> {
    current_user(&state, user_id).await?;
    let max = state.config.limits.max_challenge_participants;
    let challenge = challenges::join(&state.db, user_id, &id, max).await?;
    info!(%user_id, challenge_id = %id, "challenge joined");
    analytics::record(
        &state.db,
        Some(user_id),
        "challenge_joined",
        serde_json::json!({ "challenge_id": id }),
    )
    .await;
    Ok((StatusCode::CREATED, Json(challenge)))
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Friend>>> {
    Ok(Json(friends::list(&state.db, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_friend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddFriendRequest>,
) -> AppResult<(StatusCode, Json<Friend>)> {
    current_user(&state, user_id).await?;
    let max = state.config.limits.max_friends;
    let friend = friends::add(&state.db, user_id, &payload.username, max).await?;
    info!(%user_id, friend_id = %friend.id, "friend added");
    Ok((StatusCode::CREATED, Json(friend)))
}

#[instrument(skip(state, payload))]
pub async fn share_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ShareRequest>,
) -> AppResult<Json<ShareResponse>> {
    current_user(&state, user_id).await?;
    analytics::log_event(&state.db, Some(user_id), "progress_shared", payload.progress).await?;
    let new_achievements = achievements::check_and_award(&state.db, user_id).await?;
    Ok(Json(ShareResponse {
        shared: true,
        new_achievements,
    }))
}

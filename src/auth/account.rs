use std::collections::HashSet;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    current_user,
    dto::PublicUser,
    jwt::AuthUser,
    password::{hash_password, verify_password, MIN_PASSWORD_LEN},
    repo::{DietPreferences, User},
};
use crate::{
    analytics,
    error::{AppError, AppResult},
    nutrition::BodyProfile,
    recognition,
    state::AppState,
};

/// Word the user types to confirm account deletion.
pub const DELETE_CONFIRMATION: &str = "FSHI";

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
    pub confirmation: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/profile", put(update_profile))
        .route("/me/preferences", put(update_preferences))
        .route("/me/password", post(change_password))
}

/// Normalises a preference list, keeping the first occurrence of each entry.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<BodyProfile>,
) -> AppResult<Json<PublicUser>> {
    if let Err(msg) = payload.validate() {
        warn!(%msg, "invalid profile");
        return Err(AppError::BadRequest(msg));
    }
    current_user(&state, user_id).await?;
    User::update_profile(&state.db, user_id, &payload).await?;
    info!(%user_id, "profile updated");
    analytics::record(&state.db, Some(user_id), "profile_updated", json!({})).await;
    Ok(Json(PublicUser::from(current_user(&state, user_id).await?)))
}

#[instrument(skip(state, payload))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DietPreferences>,
) -> AppResult<Json<PublicUser>> {
    current_user(&state, user_id).await?;
    let prefs = DietPreferences {
        dietary_restrictions: clean_list(payload.dietary_restrictions),
        favorite_cuisines: clean_list(payload.favorite_cuisines),
        disliked_foods: clean_list(payload.disliked_foods),
    };
    User::update_preferences(&state.db, user_id, &prefs).await?;
    info!(%user_id, "preferences updated");
    Ok(Json(PublicUser::from(current_user(&state, user_id).await?)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = current_user(&state, user_id).await?;
    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(%user_id, "password change with wrong current password");
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }
    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request("Password too short"));
    }
    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user_id, &hash).await?;
    info!(%user_id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Removes the user, every dependent row and archived photos.
#[instrument(skip(state, payload))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> AppResult<StatusCode> {
    let user = current_user(&state, user_id).await?;
    if payload.confirmation.trim() != DELETE_CONFIRMATION {
        return Err(AppError::bad_request(format!(
            "Type {DELETE_CONFIRMATION} to confirm"
        )));
    }
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%user_id, "account deletion with wrong password");
        return Err(AppError::Unauthorized("Password is incorrect".into()));
    }

    let photo_keys = recognition::repo::image_keys(&state.db, user_id).await?;
    User::delete(&state.db, user_id).await?;

    if let Some(storage) = &state.storage {
        for key in &photo_keys {
            if let Err(e) = storage.delete_object(key).await {
                warn!(error = %e, %key, "photo cleanup failed");
            }
        }
    }
    info!(%user_id, photos = photo_keys.len(), "account deleted");
    analytics::record(&state.db, None, "account_deleted", json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_drops_scattered_duplicates() {
        let items = ["Mish", "peshk", " mish ", "", "PESHK", "djathë"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(clean_list(items), vec!["mish", "peshk", "djathë"]);
    }
}

use std::time::Duration;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, GuestResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
    jwt::{AuthUser, JwtKeys},
    password::{hash_password, is_valid_email, is_valid_username, verify_password, MIN_PASSWORD_LEN},
    repo::{NewUser, User},
};
use crate::{
    analytics,
    error::{AppError, AppResult},
    nutrition::{Activity, BodyProfile, Gender, Goal},
    skills::CookingSkill,
    state::AppState,
};

/// Guest sessions cannot be refreshed and expire after this long at most.
pub const GUEST_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/guest", post(guest))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).delete(super::account::delete_account))
}

fn issue_tokens(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(AppError::bad_request("Invalid username"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::bad_request("Password too short"));
    }
    let profile = payload.profile.unwrap_or_default();
    if let Err(msg) = profile.validate() {
        return Err(AppError::BadRequest(msg));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if User::find_by_username(&state.db, &payload.username).await?.is_some() {
        warn!(username = %payload.username, "username taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email: &payload.email,
            username: &payload.username,
            password_hash: &hash,
            cooking_skill: payload.cooking_skill.unwrap_or_default(),
            profile: &profile,
        },
    )
    .await
    .map_err(|e| AppError::from_insert(e, "Email or username already registered"))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    analytics::record(&state.db, Some(user.id), "user_registered", json!({})).await;
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    User::touch_login(&state.db, user.id).await?;
    info!(user_id = %user.id, "user logged in");
    analytics::record(&state.db, Some(user.id), "user_login", json!({})).await;
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(issue_tokens(&state, user)?))
}

/// POST /auth/guest: a throwaway account with a sample profile and an
/// unguessable password, so the session ends when its token expires.
#[instrument(skip(state))]
pub async fn guest(State(state): State<AppState>) -> AppResult<(StatusCode, Json<GuestResponse>)> {
    let tag = Uuid::new_v4().simple().to_string();
    let email = format!("mysafir-{tag}@mysafir.local");
    let username = format!("mysafir-{}", &tag[..8]);
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let hash = hash_password(&secret)?;
    let profile = BodyProfile {
        age: 30,
        height_cm: 175.0,
        weight_kg: 70.0,
        gender: Gender::Male,
        activity: Activity::Moderate,
        goal: Goal::WeightLoss,
    };

    let user = User::create(
        &state.db,
        NewUser {
            email: &email,
            username: &username,
            password_hash: &hash,
            cooking_skill: CookingSkill::Intermediate,
            profile: &profile,
        },
    )
    .await
    .map_err(|e| AppError::from_insert(e, "Guest name collision, try again"))?;

    let keys = JwtKeys::from_ref(&state);
    let ttl = GUEST_TOKEN_TTL.min(keys.access_ttl);
    let access_token = keys.sign_access_for(user.id, ttl)?;
    info!(user_id = %user.id, "guest session started");
    analytics::record(&state.db, Some(user.id), "guest_login", json!({})).await;
    Ok((
        StatusCode::CREATED,
        Json(GuestResponse {
            access_token,
            expires_in: ttl.as_secs(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(PublicUser::from(user)))
}

/// Loads the caller's record; a token for a deleted account is rejected.
pub async fn current_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::{
    generator::build_report,
    repo::{self, NutritionReport},
};
use crate::{
    analytics,
    auth::{current_user, AuthUser},
    error::{AppError, AppResult},
    plans,
    social::achievements,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/reports", post(generate).get(list))
}

/// Builds a weekly report from the caller's latest plan.
#[instrument(skip(state))]
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<(StatusCode, Json<NutritionReport>)> {
    let user = current_user(&state, user_id).await?;
    let plan = plans::repo::latest(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("No meal plan to report on"))?;

    let draft = build_report(&plan.plan.0.week, &user.profile.0);
    let report = repo::insert(&state.db, user_id, plan.week_start, &draft).await?;
    info!(%user_id, report_id = %report.id, "nutrition report generated");
    analytics::record(
        &state.db,
        Some(user_id),
        "nutrition_report_generated",
        json!({ "report_id": report.id, "plan_id": plan.id }),
    )
    .await;
    achievements::check_report(&state.db, user_id, &draft.goals_met).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<NutritionReport>>> {
    let limit = q.limit.unwrap_or(12).clamp(1, 52);
    Ok(Json(repo::list(&state.db, user_id, limit).await?))
}

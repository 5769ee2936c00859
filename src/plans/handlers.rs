use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{GeneratePlanRequest, ListQuery, MealSubstitution, PlanResponse, PlanSummary, SubstitutionRequest},
    repo::{self, StoredPlan},
    services::{full_shopping_list, generate_plan, plan_csv, plan_response, substitutions},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    planner::ShoppingItem,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan).get(list_plans))
        .route("/plans/:id", get(get_plan))
        .route("/plans/:id/shopping-list", get(shopping_list))
        .route("/plans/:id/export.csv", get(export_csv))
        .route("/plans/:id/substitutions", post(plan_substitutions))
}

async fn load_plan(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<StoredPlan> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Plan not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GeneratePlanRequest>,
) -> AppResult<(StatusCode, Json<PlanResponse>)> {
    let response = generate_plan(&state, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<PlanSummary>>> {
    let limit = q.limit.unwrap_or(10).clamp(1, 50);
    let plans = repo::list_recent(&state.db, user_id, limit).await?;
    Ok(Json(plans.iter().map(StoredPlan::summary).collect()))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PlanResponse>> {
    let plan = load_plan(&state, user_id, id).await?;
    Ok(Json(plan_response(plan, 0, Vec::new())))
}

#[instrument(skip(state))]
pub async fn shopping_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ShoppingItem>>> {
    let plan = load_plan(&state, user_id, id).await?;
    Ok(Json(full_shopping_list(&plan.plan.0)))
}

#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = load_plan(&state, user_id, id).await?;
    let body = plan_csv(&plan.plan.0.week);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"plani-{id}.csv\""),
            ),
        ],
        body,
    ))
}

#[instrument(skip(state, payload))]
pub async fn plan_substitutions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubstitutionRequest>,
) -> AppResult<Json<Vec<MealSubstitution>>> {
    let pantry: Vec<String> = payload
        .pantry
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if pantry.is_empty() {
        warn!("empty pantry");
        return Err(AppError::bad_request("pantry is required"));
    }
    let plan = load_plan(&state, user_id, id).await?;
    Ok(Json(substitutions(&state, &plan.plan.0.week, &pantry).await))
}

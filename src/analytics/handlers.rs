use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;

use super::{insights, repo};
use crate::{
    auth::AuthUser, error::AppResult, plans, preferences, reports, state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub days: i64,
    pub events: BTreeMap<String, i64>,
    pub insights: insights::Insights,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/analytics", get(user_analytics))
}

#[instrument(skip(state))]
pub async fn user_analytics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsResponse>> {
    let days = q.days.unwrap_or(30).clamp(1, 365);
    let events = repo::counts_since(&state.db, user_id, days).await?;
    let plan_dates = plans::repo::plan_dates(&state.db, user_id, 50).await?;
    let reports = reports::repo::list(&state.db, user_id, 12).await?;
    let prefs = preferences::repo::preferences(&state.db, user_id).await?;

    Ok(Json(AnalyticsResponse {
        days,
        events,
        insights: insights::build(&plan_dates, &reports, &prefs, OffsetDateTime::now_utc()),
    }))
}

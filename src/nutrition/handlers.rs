use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::{
    targets::{calc_tdee, kcal_split, macro_targets, MacroTargets, MealSplit, DEFAULT_PATTERN},
    types::{Activity, BodyProfile, Goal},
};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct TargetsRequest {
    pub profile: BodyProfile,
    pub activity: Option<Activity>,
    pub goal: Option<Goal>,
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyTargets {
    pub kcal: u32,
    pub protein_from_weight_g: u32,
    pub macros: MacroTargets,
    pub split: MealSplit,
}

impl DailyTargets {
    pub fn compute(profile: &BodyProfile, activity: Activity, goal: Goal, pattern: &str) -> Self {
        let (kcal, protein_from_weight_g) = calc_tdee(profile, activity, goal);
        Self {
            kcal,
            protein_from_weight_g,
            macros: macro_targets(kcal, goal, protein_from_weight_g),
            split: kcal_split(kcal, pattern),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/nutrition/targets", post(targets))
}

#[instrument(skip(payload))]
pub async fn targets(Json(payload): Json<TargetsRequest>) -> Result<Json<DailyTargets>, AppError> {
    if let Err(msg) = payload.profile.validate() {
        warn!(%msg, "invalid profile");
        return Err(AppError::BadRequest(msg));
    }
    let activity = payload.activity.unwrap_or(payload.profile.activity);
    let goal = payload.goal.unwrap_or(payload.profile.goal);
    let pattern = payload.pattern.as_deref().unwrap_or(DEFAULT_PATTERN);
    Ok(Json(DailyTargets::compute(
        &payload.profile,
        activity,
        goal,
        pattern,
    )))
}

use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod targets;
pub mod types;

pub use targets::{calc_tdee, kcal_split, macro_targets, MacroTargets, MealSplit};
pub use types::{Activity, BodyProfile, Gender, Goal, MealSlot};

pub fn router() -> Router<AppState> {
    handlers::routes()
}

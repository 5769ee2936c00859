//! Branded supplement products and how they blend into a meal plan.

use axum::Router;

use crate::state::AppState;

pub mod catalog;
pub mod handlers;
pub mod integration;
pub mod rules;

pub use catalog::{SupplementCatalog, SupplementProduct};
pub use integration::{integrate_plan, nutrition_summary, SupplementNutrition};
pub use rules::{combine, recommend, recommend_within, CombinationPolicy, Recommendation};

pub fn router() -> Router<AppState> {
    handlers::routes()
}

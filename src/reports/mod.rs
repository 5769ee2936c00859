//! Weekly nutrition reports.

use axum::Router;

use crate::state::AppState;

pub mod generator;
pub mod handlers;
pub mod repo;

pub use repo::NutritionReport;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

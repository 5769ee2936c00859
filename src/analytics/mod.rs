//! Usage events and the insights derived from them.

use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod insights;
pub mod repo;

pub use repo::{log_event, record};

pub fn router() -> Router<AppState> {
    handlers::routes()
}

//! Food photo recognition through the vision model.

use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod repo;
pub mod services;

pub fn router(max_image_size_mb: usize) -> Router<AppState> {
    handlers::routes(max_image_size_mb)
}

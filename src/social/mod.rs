//! Achievements, community challenges, friends and progress sharing.

use axum::Router;

use crate::state::AppState;

pub mod achievements;
pub mod challenges;
pub mod friends;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

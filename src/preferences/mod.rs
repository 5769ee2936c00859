use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod learning;
pub mod repo;

pub use learning::{PreferenceMap, PreferenceStat};

pub fn router() -> Router<AppState> {
    handlers::routes()
}

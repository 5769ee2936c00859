use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use handlers::current_user;
pub use jwt::{AuthUser, JwtKeys};
pub use repo::{DietPreferences, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
        .merge(account::routes())
}

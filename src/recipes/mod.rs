use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod model;
pub mod repo;

pub use model::Recipe;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

/// Built-in recipes merged with every stored generated recipe.
pub async fn recipe_book(state: &AppState) -> anyhow::Result<Vec<Recipe>> {
    let stored = repo::list_generated(&state.db).await?;
    Ok(model::merge_recipes(&state.recipes, stored))
}

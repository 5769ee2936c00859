use axum::{
    extract::Query,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{
    catalog::{SupplementCatalog, SupplementProduct},
    rules::{recommend, recommend_within, Recommendation},
};
use crate::{
    nutrition::{Goal, MealSlot},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub goal: Goal,
    pub slot: MealSlot,
    pub target_kcal: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/supplements", get(list_products))
        .route("/supplements/recommendations", get(recommendations))
}

pub async fn list_products() -> Json<&'static [SupplementProduct]> {
    Json(SupplementCatalog::builtin().products())
}

#[instrument]
pub async fn recommendations(Query(q): Query<RecommendationQuery>) -> Json<Recommendation> {
    let catalog = SupplementCatalog::builtin();
    let rec = match q.target_kcal {
        Some(kcal) => recommend_within(catalog, q.goal, q.slot, kcal),
        None => recommend(catalog, q.goal, q.slot),
    };
    Json(rec)
}

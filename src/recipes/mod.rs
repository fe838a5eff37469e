use crate::state::AppState;
use axum::Router;

pub mod defaults;
mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::recipe_routes())
        .merge(handlers::planner_variant_routes())
        .merge(handlers::default_recipe_routes())
}

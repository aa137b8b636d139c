pub mod budget;
pub mod expenses;
pub mod map;
pub mod meta;
pub mod plans;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(meta::router())
        .merge(plans::router())
        .merge(budget::router())
        .merge(expenses::router())
        .merge(map::router());

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

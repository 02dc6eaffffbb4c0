pub mod ai;
pub mod assistant;
pub mod payments;
pub mod settings;
pub mod whatsapp;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(assistant::router())
        .merge(ai::router())
        .merge(payments::router())
        .merge(settings::router())
        .merge(whatsapp::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! Axum router wiring.

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    // the counter is embedded by static sites served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/counter", get(api::get_counter))
        .route("/api/counter/increment", post(api::increment_counter))
        .route("/api/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .layer(cors)
        .with_state(state)
}

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::handlers::search;

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub(crate) fn build_api_router(state: AppState, api_port: u16) -> Router {
    Router::new()
        .route("/api/health", get(search::health))
        .route("/api/search", post(search::initiate_search))
        .route("/api/search/{id}", get(search::search_status))
        .route("/api/search/{id}/clear", post(search::clear_search))
        .layer(build_localhost_cors(api_port))
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware, outer to inner:
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive CORS; the collect endpoint is called from a
///    script tag embedded on third-party sites, so browsers need CORS
///    headers on it.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/collect", post(routes::collect::collect))
        .route(
            "/api/websites/{id}/chart",
            get(routes::chart::get_chart),
        )
        .route(
            "/api/websites/{id}/sparkline",
            get(routes::sparkline::get_sparkline),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

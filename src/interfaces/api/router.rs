use super::health;
use super::prediction;
use super::state::AppState;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the HTTP surface. `/pred` and `/pred/` are equivalent.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/pred/",
            get(prediction::predict_query).post(prediction::predict_json),
        )
        .route(
            "/pred",
            get(prediction::predict_query).post(prediction::predict_json),
        )
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

//! Liveness and metrics endpoints

use super::state::AppState;
use crate::domain::optimization::Hyperparameters;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: Uuid,
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub hyperparameters: Hyperparameters,
    pub cv_score: f64,
    pub test_score: f64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let meta = &state.metadata;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: ModelInfo {
            id: meta.model_id,
            name: state.service.model_name().to_string(),
            trained_at: meta.trained_at,
            hyperparameters: meta.hyperparameters,
            cv_score: meta.cv_score,
            test_score: meta.test_score,
        },
    })
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

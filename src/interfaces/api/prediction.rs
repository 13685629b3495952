//! Rent prediction endpoints

use super::error::ApiError;
use super::extract::JsonFields;
use super::state::AppState;
use crate::domain::apartment::{PredictionRequest, PredictionResult};
use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Instant;

/// `GET /pred/?area=..&bedrooms=..`
pub async fn predict_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PredictionResult>, ApiError> {
    let fields: Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    predict(&state, &fields).await
}

/// `POST /pred/` with a JSON object body
pub async fn predict_json(
    State(state): State<AppState>,
    JsonFields(fields): JsonFields,
) -> Result<Json<PredictionResult>, ApiError> {
    predict(&state, &fields).await
}

async fn predict(
    state: &AppState,
    fields: &Map<String, Value>,
) -> Result<Json<PredictionResult>, ApiError> {
    let start = Instant::now();
    let result = match PredictionRequest::from_fields(fields) {
        Ok(request) => state
            .service
            .predict_with_timeout(&request, state.predict_timeout)
            .await
            .map_err(ApiError::from),
        Err(invalid) => Err(ApiError::from(invalid)),
    };

    match result {
        Ok(prediction) => {
            state.metrics.observe_latency(start.elapsed().as_secs_f64());
            state.metrics.inc_predictions("ok");
            Ok(Json(prediction))
        }
        Err(err) => {
            state.metrics.inc_predictions(err.outcome());
            Err(err)
        }
    }
}

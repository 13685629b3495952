//! Error responses for the prediction API

use crate::domain::errors::{InferenceError, PredictionError, ValidationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const BAD_INPUT: &str = "Bad input params";

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, description: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                description: description.into(),
                errors,
            },
        }
    }

    /// 400 with the fixed description and per-field detail
    pub fn bad_input(errors: Vec<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, BAD_INPUT, errors)
    }

    /// Label used for the prediction counter
    pub fn outcome(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST => "invalid",
            StatusCode::SERVICE_UNAVAILABLE => "timeout",
            _ => "error",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_input(err.issues.iter().map(ToString::to_string).collect())
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Validation(v) => v.into(),
            InferenceError::Prediction(e @ PredictionError::Timeout { .. }) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Prediction timed out",
                vec![e.to_string()],
            ),
            InferenceError::Prediction(e @ PredictionError::Model { .. }) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Prediction failed",
                vec![e.to_string()],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {:?}", self.body.description, self.body.errors);
        } else {
            warn!("{}: {:?}", self.body.description, self.body.errors);
        }
        (self.status, Json(self.body)).into_response()
    }
}

//! Request body extractor that rejects with the API error format

use super::error::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

/// A JSON object body, kept untyped so validation can report every field.
///
/// Malformed JSON, non-object bodies, and unreadable bodies are all
/// rejected as bad input rather than axum's default plain-text rejections.
#[derive(Debug, Clone, Default)]
pub struct JsonFields(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_input(vec![format!("Failed to read request body: {}", e)]))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => Ok(JsonFields(fields)),
            Ok(_) => Err(ApiError::bad_input(vec![
                "Request body must be a JSON object".to_string(),
            ])),
            Err(e) => Err(ApiError::bad_input(vec![format!(
                "Invalid JSON syntax: {}",
                e
            )])),
        }
    }
}

use crate::application::ml::encoder::FeatureEncoder;
use crate::application::ml::predictor::PricePredictor;
use crate::domain::apartment::{GARDEN_FIELD, PredictionRequest, PredictionResult};
use crate::domain::errors::{InferenceError, PipelineError, PredictionError, ValidationError};
use crate::domain::ml::{EncodingSchema, FeatureVector, ModelArtifact};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serves predictions from one immutable model. Cloning shares the model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn PricePredictor>,
    schema: Arc<EncodingSchema>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn PricePredictor>, schema: EncodingSchema) -> Result<Self, PipelineError> {
        let missing = schema.missing_features();
        if !missing.is_empty() {
            return Err(PipelineError::Encoding {
                reason: format!("encoding schema lacks features {:?}", missing),
            });
        }
        Ok(Self {
            model,
            schema: Arc::new(schema),
        })
    }

    pub fn from_artifact<M>(artifact: ModelArtifact<M>) -> Result<Self, PipelineError>
    where
        M: PricePredictor + 'static,
    {
        Self::new(Arc::new(artifact.model), artifact.metadata.encoding)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Encode a validated request in canonical feature order.
    pub fn feature_vector(&self, request: &PredictionRequest) -> Result<FeatureVector, ValidationError> {
        FeatureEncoder::encode_request(request, &self.schema)
            .map_err(|e| ValidationError::single(GARDEN_FIELD, e.to_string()))
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, InferenceError> {
        let features = self.feature_vector(request)?;
        let prediction = self.model.predict(&features)?;
        debug!("Predicted {:.2} for {:?}", prediction, features);
        Ok(PredictionResult { prediction })
    }

    /// Validate an untyped field map, then predict.
    pub fn predict_fields(&self, fields: &Map<String, Value>) -> Result<PredictionResult, InferenceError> {
        let request = PredictionRequest::from_fields(fields)?;
        self.predict(&request)
    }

    /// Like [`predict`](Self::predict), but the model call runs on the
    /// blocking pool and is abandoned once `budget` elapses.
    pub async fn predict_with_timeout(
        &self,
        request: &PredictionRequest,
        budget: Duration,
    ) -> Result<PredictionResult, InferenceError> {
        let features = self.feature_vector(request)?;
        let model = Arc::clone(&self.model);

        let call = tokio::task::spawn_blocking(move || model.predict(&features));
        let prediction = match tokio::time::timeout(budget, call).await {
            Ok(joined) => joined.map_err(|e| PredictionError::Model {
                reason: format!("prediction task failed: {}", e),
            })??,
            Err(_) => {
                return Err(PredictionError::Timeout {
                    duration_ms: budget.as_millis() as u64,
                }
                .into());
            }
        };

        Ok(PredictionResult { prediction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::{Feature, IndicatorColumns};
    use crate::domain::optimization::Hyperparameters;
    use serde_json::json;

    /// Area plus 100 per balcony, so the encoding is visible in the output.
    struct LinearStub {
        delay: Duration,
    }

    impl PricePredictor for LinearStub {
        fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictionError> {
            std::thread::sleep(self.delay);
            Ok(rows
                .iter()
                .map(|r| r.get(Feature::Area) + 100.0 * r.get(Feature::BalconyYes))
                .collect())
        }

        fn hyperparameters(&self) -> Hyperparameters {
            Hyperparameters {
                n_estimators: 1,
                max_depth: 1,
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn schema() -> EncodingSchema {
        let indicators = ["balcony", "parking", "furnished", "garage", "storage"]
            .iter()
            .map(|field| IndicatorColumns {
                field: field.to_string(),
                dropped: "no".to_string(),
                categories: vec!["yes".to_string()],
            })
            .collect();
        EncodingSchema { indicators }
    }

    fn service(delay: Duration) -> PredictionService {
        PredictionService::new(Arc::new(LinearStub { delay }), schema()).unwrap()
    }

    fn fields(balcony: &str, garden: &str) -> Map<String, Value> {
        let value = json!({
            "area": 55,
            "constraction_year": 1999,
            "bedrooms": 2,
            "garden": garden,
            "balcony": balcony,
            "parking": "no",
            "furnished": "no",
            "garage": "no",
            "storage": "yes"
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_predict_uses_schema_encoding() {
        let service = service(Duration::ZERO);
        assert_eq!(
            service.predict_fields(&fields("yes", "Not present")).unwrap(),
            PredictionResult { prediction: 155.0 }
        );
        assert_eq!(
            service.predict_fields(&fields("no", "Not present")).unwrap(),
            PredictionResult { prediction: 55.0 }
        );
    }

    #[test]
    fn test_unparsable_garden_is_validation_error() {
        let err = service(Duration::ZERO)
            .predict_fields(&fields("yes", "huge"))
            .unwrap_err();
        match err {
            InferenceError::Validation(v) => assert_eq!(v.issues[0].field, "garden"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_incomplete_schema() {
        let result = PredictionService::new(
            Arc::new(LinearStub {
                delay: Duration::ZERO,
            }),
            EncodingSchema::default(),
        );
        assert!(matches!(result, Err(PipelineError::Encoding { .. })));
    }

    #[tokio::test]
    async fn test_predict_with_timeout_expires() {
        let service = service(Duration::from_millis(300));
        let request = PredictionRequest::from_fields(&fields("no", "10m2")).unwrap();

        let err = service
            .predict_with_timeout(&request, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Prediction(PredictionError::Timeout { duration_ms: 20 })
        ));
    }

    #[tokio::test]
    async fn test_predict_with_timeout_within_budget() {
        let service = service(Duration::ZERO);
        let request = PredictionRequest::from_fields(&fields("yes", "10m2")).unwrap();

        let result = service
            .predict_with_timeout(&request, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(result.prediction, 155.0);
    }
}

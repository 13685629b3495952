use crate::domain::errors::PredictionError;
use crate::domain::ml::FeatureVector;
use crate::domain::optimization::Hyperparameters;

/// Interface for a fitted rent model
pub trait PricePredictor: Send + Sync {
    /// Predict prices for a batch of vectors in canonical feature order
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictionError>;

    /// Predict the rent for one apartment
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        self.predict_batch(std::slice::from_ref(features))?
            .first()
            .copied()
            .ok_or_else(|| PredictionError::Model {
                reason: "No prediction returned".to_string(),
            })
    }

    /// Settings the model was fitted with
    fn hyperparameters(&self) -> Hyperparameters;

    /// Get model name/type
    fn name(&self) -> &str;
}

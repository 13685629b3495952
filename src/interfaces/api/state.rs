//! Shared state for request handlers

use crate::application::inference::PredictionService;
use crate::application::ml::ForestArtifact;
use crate::domain::errors::PipelineError;
use crate::domain::ml::ArtifactMetadata;
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Duration;

/// Everything a handler needs; cheap to clone, never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub metadata: Arc<ArtifactMetadata>,
    pub metrics: Metrics,
    pub predict_timeout: Duration,
}

impl AppState {
    pub fn new(
        artifact: ForestArtifact,
        metrics: Metrics,
        predict_timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let metadata = Arc::new(artifact.metadata.clone());
        metrics.model_test_score.set(metadata.test_score);

        Ok(Self {
            service: PredictionService::from_artifact(artifact)?,
            metadata,
            metrics,
            predict_timeout,
        })
    }
}

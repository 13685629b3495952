//! End-to-end training run.
//!
//! load -> encode -> features/target -> split -> grid search -> evaluate -> save.
//! Stages run strictly in order and the first failure aborts the run before
//! anything is written.

use crate::application::ml::encoder::FeatureEncoder;
use crate::application::ml::frame::Frame;
use crate::application::ml::predictor::PricePredictor;
use crate::application::ml::smartcore_predictor::RandomForestModel;
use crate::application::ml::splitter::{DEFAULT_TEST_FRACTION, DatasetSplitter};
use crate::application::optimization::evaluator::{EvaluationReport, ModelEvaluator};
use crate::application::optimization::grid_search::{
    DEFAULT_CV_FOLDS, GridSearchTrainer, ParameterGrid,
};
use crate::config::ModelEnvConfig;
use crate::domain::errors::PipelineError;
use crate::domain::ml::{ArtifactMetadata, ModelArtifact};
use crate::domain::optimization::Hyperparameters;
use crate::domain::ports::{ApartmentSource, ModelStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// What a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub model_id: Uuid,
    pub hyperparameters: Hyperparameters,
    pub cv_score: f64,
    pub test: EvaluationReport,
    pub artifact_path: PathBuf,
    pub training_rows: usize,
    pub dropped_rows: usize,
}

pub struct TrainingPipeline {
    source: Arc<dyn ApartmentSource>,
    encoder: FeatureEncoder,
    splitter: DatasetSplitter,
    trainer: GridSearchTrainer,
    store: Arc<dyn ModelStore<RandomForestModel>>,
}

impl TrainingPipeline {
    /// Pipeline with the default grid, 5 folds, a 20% test split and seed 42.
    pub fn new(
        source: Arc<dyn ApartmentSource>,
        store: Arc<dyn ModelStore<RandomForestModel>>,
    ) -> Self {
        let seed = 42;
        Self {
            source,
            encoder: FeatureEncoder::default(),
            splitter: DatasetSplitter::new(DEFAULT_TEST_FRACTION, seed),
            trainer: GridSearchTrainer::new(ParameterGrid::default(), DEFAULT_CV_FOLDS, seed),
            store,
        }
    }

    pub fn from_config(
        config: &ModelEnvConfig,
        grid: ParameterGrid,
        source: Arc<dyn ApartmentSource>,
        store: Arc<dyn ModelStore<RandomForestModel>>,
    ) -> Self {
        Self {
            source,
            encoder: FeatureEncoder::new(config.garden_policy),
            splitter: DatasetSplitter::new(config.test_fraction, config.seed),
            trainer: GridSearchTrainer::new(grid, config.cv_folds, config.seed),
            store,
        }
    }

    pub fn with_encoder(mut self, encoder: FeatureEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_splitter(mut self, splitter: DatasetSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_trainer(mut self, trainer: GridSearchTrainer) -> Self {
        self.trainer = trainer;
        self
    }

    pub async fn run(&self) -> Result<TrainingSummary, PipelineError> {
        info!("Starting training from {}", self.source.describe());

        let records = self.source.load_all().await?;
        info!("Loaded {} rows", records.len());

        let encoded = self.encoder.encode(Frame::from_records(&records))?;
        let features = encoded.frame.feature_vectors()?;
        let target = encoded.frame.target()?;

        let split = self.splitter.split(&features, &target)?;
        let training_rows = split.x_train.len();
        info!(
            "Split into {} training and {} test rows",
            training_rows,
            split.x_test.len()
        );

        let trainer = self.trainer.clone();
        let (x_train, y_train) = (split.x_train, split.y_train);
        let outcome = tokio::task::spawn_blocking(move || trainer.search(&x_train, &y_train))
            .await
            .map_err(|e| PipelineError::Training {
                reason: format!("search task failed: {}", e),
            })??;

        let test = ModelEvaluator::evaluate(&outcome.model, &split.x_test, &split.y_test)?;
        let cv_score = outcome.best.mean_score;

        let hyperparameters = outcome.model.hyperparameters();
        let metadata = ArtifactMetadata::new(
            encoded.schema,
            hyperparameters,
            cv_score,
            test.r2,
            training_rows,
        );
        let model_id = metadata.model_id;
        let artifact = ModelArtifact {
            metadata,
            model: outcome.model,
        };

        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&artifact))
            .await
            .map_err(|e| PipelineError::Serialization {
                path: self.store.location(),
                reason: e.to_string(),
            })??;

        info!(
            "Training complete: model {} ({}) test R2={:.4}",
            model_id, hyperparameters, test.r2
        );

        Ok(TrainingSummary {
            model_id,
            hyperparameters,
            cv_score,
            test,
            artifact_path: self.store.location(),
            training_rows,
            dropped_rows: encoded.dropped_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::encoder::GardenPolicy;
    use crate::domain::apartment::RawRecord;
    use crate::infrastructure::mock::InMemoryApartmentSource;
    use crate::infrastructure::persistence::ModelRegistry;

    fn registry(path: &std::path::Path) -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::new(path))
    }

    fn yes_no(flag: bool) -> String {
        if flag { "yes" } else { "no" }.to_string()
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                let area = 30.0 + (i * 7 % 90) as f64;
                let garden = if i % 3 == 0 {
                    "Not present".to_string()
                } else {
                    format!("{}m2", 5 + i % 40)
                };
                RawRecord {
                    area,
                    constraction_year: 1960.0 + (i % 60) as f64,
                    bedrooms: (1 + i % 4) as f64,
                    garden,
                    balcony: yes_no(i % 2 == 0),
                    parking: yes_no(i % 3 == 0),
                    furnished: yes_no(i % 4 == 0),
                    garage: yes_no(i % 5 == 0),
                    storage: yes_no(i % 2 == 1),
                    rent: 400.0 + 12.0 * area + if i % 2 == 0 { 80.0 } else { 0.0 },
                }
            })
            .collect()
    }

    fn small_trainer() -> GridSearchTrainer {
        let grid = ParameterGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![3, 6],
        };
        GridSearchTrainer::new(grid, 3, 42).sequential()
    }

    #[tokio::test]
    async fn test_run_saves_loadable_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_v1");
        let source = Arc::new(InMemoryApartmentSource::new(records(60)));

        let summary = TrainingPipeline::new(source, registry(&path))
            .with_trainer(small_trainer())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.training_rows, 48);
        assert_eq!(summary.dropped_rows, 0);
        assert_eq!(summary.test.samples, 12);

        let artifact = ModelRegistry::new(&path).load().unwrap();
        assert_eq!(artifact.metadata.model_id, summary.model_id);
        assert_eq!(artifact.metadata.hyperparameters, summary.hyperparameters);
    }

    #[tokio::test]
    async fn test_bad_garden_aborts_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_v1");
        let mut rows = records(30);
        rows[4].garden = "big".to_string();

        let source = Arc::new(InMemoryApartmentSource::new(rows));

        let err = TrainingPipeline::new(source, registry(&path))
            .with_trainer(small_trainer())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Parse { row: 4, .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_row_policy_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_v1");
        let mut rows = records(40);
        rows[4].garden = "big".to_string();

        let source = Arc::new(InMemoryApartmentSource::new(rows));

        let summary = TrainingPipeline::new(source, registry(&path))
            .with_encoder(FeatureEncoder::new(GardenPolicy::DropRow))
            .with_trainer(small_trainer())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.dropped_rows, 1);
        assert_eq!(summary.training_rows, 31);
    }

    #[tokio::test]
    async fn test_unwritable_artifact_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_v1");
        std::fs::create_dir(&path).unwrap();
        let source = Arc::new(InMemoryApartmentSource::new(records(40)));

        let err = TrainingPipeline::new(source, registry(&path))
            .with_trainer(small_trainer())
            .run()
            .await
            .unwrap_err();

        match err {
            PipelineError::Serialization { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(path.is_dir());
    }
}

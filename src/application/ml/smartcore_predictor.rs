use super::predictor::PricePredictor;
use crate::domain::errors::{PipelineError, PredictionError};
use crate::domain::ml::ModelArtifact;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FeatureVector, to_rows};
use crate::domain::optimization::Hyperparameters;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;

pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// What training saves and serving loads
pub type ForestArtifact = ModelArtifact<RandomForestModel>;

/// SmartCore random forest together with the settings it was fitted with.
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    params: Hyperparameters,
    seed: u64,
    forest: Forest,
}

impl fmt::Debug for RandomForestModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForestModel")
            .field("params", &self.params)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl RandomForestModel {
    /// Fit a forest. Every split considers all features and the bootstrap is
    /// driven by `seed`, so identical inputs give identical trees.
    pub fn fit(
        x: &[FeatureVector],
        y: &[f64],
        params: Hyperparameters,
        seed: u64,
    ) -> Result<Self, PipelineError> {
        if x.is_empty() {
            return Err(PipelineError::InsufficientData {
                rows: 0,
                required: 1,
            });
        }

        let x_matrix = DenseMatrix::from_2d_vec(&to_rows(x)).map_err(|e| {
            PipelineError::Training {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        let parameters = RandomForestRegressorParameters::default()
            .with_n_trees(params.n_estimators)
            .with_max_depth(params.max_depth)
            .with_min_samples_split(2)
            .with_m(FEATURE_COUNT)
            .with_seed(seed);

        let forest = RandomForestRegressor::fit(&x_matrix, &y.to_vec(), parameters).map_err(
            |e| PipelineError::Training {
                reason: format!("Random forest fit failed ({}): {}", params, e),
            },
        )?;

        Ok(Self {
            params,
            seed,
            forest,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl PricePredictor for RandomForestModel {
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictionError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let input_matrix =
            DenseMatrix::from_2d_vec(&to_rows(rows)).map_err(|e| PredictionError::Model {
                reason: format!("Matrix creation failed: {}", e),
            })?;

        self.forest
            .predict(&input_matrix)
            .map_err(|e| PredictionError::Model {
                reason: format!("Prediction failed: {}", e),
            })
    }

    fn hyperparameters(&self) -> Hyperparameters {
        self.params
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}

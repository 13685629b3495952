//! Model training and artifact settings, parsed from environment variables.

use crate::application::ml::encoder::GardenPolicy;
use crate::application::ml::splitter::DEFAULT_TEST_FRACTION;
use crate::application::optimization::grid_search::DEFAULT_CV_FOLDS;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub model_name: String,
    pub seed: u64,
    pub cv_folds: usize,
    pub test_fraction: f64,
    pub garden_policy: GardenPolicy,
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let cv_folds = Self::parse_usize("CV_FOLDS", DEFAULT_CV_FOLDS)?;
        if cv_folds < 2 {
            anyhow::bail!("CV_FOLDS must be at least 2, got {}", cv_folds);
        }

        let test_fraction = env::var("TEST_FRACTION")
            .unwrap_or_else(|_| DEFAULT_TEST_FRACTION.to_string())
            .parse::<f64>()
            .context("Failed to parse TEST_FRACTION")?;
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            anyhow::bail!("TEST_FRACTION must be in (0, 1), got {}", test_fraction);
        }

        let garden_policy = env::var("GARDEN_PARSE_POLICY")
            .unwrap_or_else(|_| "abort".to_string())
            .parse::<GardenPolicy>()?;

        Ok(Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models".to_string())
                .into(),
            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "rf_v1".to_string()),
            seed: env::var("TRAINING_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse::<u64>()
                .context("Failed to parse TRAINING_SEED")?,
            cv_folds,
            test_fraction,
            garden_policy,
        })
    }

    /// Full path of the model artifact: `MODEL_PATH/MODEL_NAME`
    pub fn artifact_path(&self) -> PathBuf {
        self.model_path.join(&self.model_name)
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }
}

//! Persisted model envelope.
//!
//! The metadata travels with every saved model so that the serving side can
//! check it was trained on the same feature layout before using it.

use super::feature_registry::{EncodingSchema, FEATURE_NAMES};
use crate::domain::optimization::Hyperparameters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ARTIFACT_FORMAT: &str = "rentwise.random_forest";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub format: String,
    pub version: u32,
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub encoding: EncodingSchema,
    pub hyperparameters: Hyperparameters,
    /// Mean cross-validated R2 of the winning candidate
    pub cv_score: f64,
    /// R2 on the held-out split
    pub test_score: f64,
    pub training_rows: usize,
}

impl ArtifactMetadata {
    /// Fresh metadata for a model trained just now on the canonical features.
    pub fn new(
        encoding: EncodingSchema,
        hyperparameters: Hyperparameters,
        cv_score: f64,
        test_score: f64,
        training_rows: usize,
    ) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            encoding,
            hyperparameters,
            cv_score,
            test_score,
            training_rows,
        }
    }

    /// Whether the stored feature list is the one this build encodes.
    pub fn matches_feature_order(&self) -> bool {
        self.feature_names == FEATURE_NAMES
    }
}

/// A fitted model of type `M` and how it was produced
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact<M> {
    pub metadata: ArtifactMetadata,
    pub model: M,
}

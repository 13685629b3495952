//! On-disk storage of trained rent models.
//!
//! An artifact is a single JSON document: metadata describing how the model
//! was trained plus the serialized forest. Writes go to a sibling temp file
//! that is renamed over the target, so readers never observe a partial file.

use crate::application::ml::smartcore_predictor::{ForestArtifact, RandomForestModel};
use crate::domain::errors::PipelineError;
use crate::domain::ml::{ARTIFACT_FORMAT, ARTIFACT_VERSION};
use crate::domain::ports::ModelStore;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Only the fields needed to decide whether the rest is worth parsing.
#[derive(Deserialize)]
struct ArtifactHeader {
    metadata: HeaderMetadata,
}

#[derive(Deserialize)]
struct HeaderMetadata {
    format: String,
    version: u32,
}

/// File-backed [`ModelStore`] for the random forest.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    path: PathBuf,
}

impl ModelRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_json(artifact: &ForestArtifact, tmp: &Path) -> std::io::Result<()> {
        let file = File::create(tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, artifact)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl ModelStore<RandomForestModel> for ModelRegistry {
    /// Write `artifact`, replacing any previous model atomically.
    fn save(&self, artifact: &ForestArtifact) -> Result<(), PipelineError> {
        let path = self.path.as_path();
        let ser_err = |reason: String| PipelineError::Serialization {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ser_err(e.to_string()))?;
        }

        let tmp = temp_path(path);
        let written = Self::write_json(artifact, &tmp).and_then(|_| fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(ser_err(e.to_string()));
        }

        info!(
            "Model {} saved to {}",
            artifact.metadata.model_id,
            path.display()
        );
        Ok(())
    }

    /// Read and validate the stored artifact.
    fn load(&self) -> Result<ForestArtifact, PipelineError> {
        let path = self.path.as_path();
        let de_err = |reason: String| PipelineError::Deserialization {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| de_err(e.to_string()))?;

        let header: ArtifactHeader =
            serde_json::from_slice(&bytes).map_err(|e| de_err(e.to_string()))?;
        if header.metadata.format != ARTIFACT_FORMAT {
            return Err(de_err(format!(
                "unknown artifact format {:?}",
                header.metadata.format
            )));
        }
        if header.metadata.version != ARTIFACT_VERSION {
            return Err(de_err(format!(
                "unsupported artifact version {} (expected {})",
                header.metadata.version, ARTIFACT_VERSION
            )));
        }

        let artifact: ForestArtifact =
            serde_json::from_slice(&bytes).map_err(|e| de_err(e.to_string()))?;

        if !artifact.metadata.matches_feature_order() {
            return Err(de_err(format!(
                "feature order mismatch: {:?}",
                artifact.metadata.feature_names
            )));
        }
        let missing = artifact.metadata.encoding.missing_features();
        if !missing.is_empty() {
            return Err(de_err(format!("encoding lacks features {:?}", missing)));
        }

        info!(
            "Loaded model {} ({}) from {}",
            artifact.metadata.model_id,
            artifact.metadata.hyperparameters,
            path.display()
        );
        Ok(artifact)
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Sibling temp file, unique per call so concurrent writers never share one.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

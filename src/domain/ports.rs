use crate::domain::apartment::RawRecord;
use crate::domain::errors::PipelineError;
use crate::domain::ml::ModelArtifact;
use async_trait::async_trait;
use std::path::PathBuf;

/// Supplier of historical apartment rows for training.
#[async_trait]
pub trait ApartmentSource: Send + Sync {
    /// Read every available record. Failures map to `PipelineError::DataLoad`.
    async fn load_all(&self) -> Result<Vec<RawRecord>, PipelineError>;

    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;
}

/// Durable home of the trained model. Blocking; call from the blocking pool.
pub trait ModelStore<M>: Send + Sync {
    /// Replace the stored model. Failures map to `PipelineError::Serialization`
    /// and leave the previous model untouched.
    fn save(&self, artifact: &ModelArtifact<M>) -> Result<(), PipelineError>;

    /// Failures map to `PipelineError::Deserialization`.
    fn load(&self) -> Result<ModelArtifact<M>, PipelineError>;

    fn location(&self) -> PathBuf;
}

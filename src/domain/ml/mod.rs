pub mod artifact;
pub mod feature_registry;

pub use artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION, ArtifactMetadata, ModelArtifact};
pub use feature_registry::{
    EncodingSchema, FEATURE_COUNT, FEATURE_NAMES, Feature, FeatureVector, IndicatorColumns,
};

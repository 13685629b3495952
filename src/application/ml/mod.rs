pub mod encoder;
pub mod frame;
pub mod predictor;
pub mod smartcore_predictor;
pub mod splitter;

pub use encoder::{FeatureEncoder, GardenPolicy};
pub use predictor::PricePredictor;
pub use smartcore_predictor::{ForestArtifact, RandomForestModel};

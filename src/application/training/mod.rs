pub mod pipeline;

pub use pipeline::{TrainingPipeline, TrainingSummary};

pub mod evaluator;
pub mod grid_search;

pub use evaluator::{EvaluationReport, ModelEvaluator};
pub use grid_search::{GridSearchTrainer, ParameterGrid};

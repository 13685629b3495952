pub mod hyperparameters;

pub use hyperparameters::{CandidateScore, Hyperparameters};

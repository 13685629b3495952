use serde::{Deserialize, Serialize};
use std::fmt;

/// Random forest settings explored by the grid search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub n_estimators: usize,
    pub max_depth: u16,
}

impl fmt::Display for Hyperparameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n_estimators={}, max_depth={}",
            self.n_estimators, self.max_depth
        )
    }
}

/// Cross-validation outcome for one grid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: Hyperparameters,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CandidateScore {
    pub fn from_folds(params: Hyperparameters, fold_scores: Vec<f64>) -> Self {
        let n = fold_scores.len().max(1) as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / n;
        // Population std
        let std_score =
            (fold_scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n).sqrt();

        Self {
            params,
            fold_scores,
            mean_score,
            std_score,
        }
    }
}

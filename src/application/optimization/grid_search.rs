//! Exhaustive hyperparameter search with k-fold cross-validation.
//!
//! Every (candidate, fold) pair is an independent fit, so the jobs run on the
//! rayon pool. Results are collected in job order and the winner is chosen
//! only after all jobs finish, which keeps the outcome identical to a
//! sequential run.

use crate::application::ml::predictor::PricePredictor;
use crate::application::ml::smartcore_predictor::RandomForestModel;
use crate::application::optimization::evaluator::r2_score;
use crate::domain::errors::PipelineError;
use crate::domain::ml::FeatureVector;
use crate::domain::optimization::{CandidateScore, Hyperparameters};
use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CV_FOLDS: usize = 5;

/// Parameter grid for the random forest search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<u16>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200, 300],
            max_depth: vec![3, 6, 9, 12],
        }
    }
}

impl ParameterGrid {
    /// Load a grid from a TOML file with `n_estimators` and `max_depth` arrays.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid config {:?}", path))?;
        let grid: ParameterGrid = toml::from_str(&content)
            .with_context(|| format!("Failed to parse grid config {:?}", path))?;
        if grid.n_estimators.is_empty() || grid.max_depth.is_empty() {
            anyhow::bail!("Grid config {:?} has an empty parameter list", path);
        }
        Ok(grid)
    }

    /// All combinations in enumeration order.
    ///
    /// Keys are taken in alphabetical order with the first key varying
    /// slowest: `max_depth` is the outer loop, `n_estimators` the inner one.
    /// Ties in the search resolve to the earliest candidate in this order.
    pub fn candidates(&self) -> Vec<Hyperparameters> {
        let mut combinations = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &n_estimators in &self.n_estimators {
                combinations.push(Hyperparameters {
                    n_estimators,
                    max_depth,
                });
            }
        }
        combinations
    }

    pub fn len(&self) -> usize {
        self.n_estimators.len() * self.max_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contiguous, unshuffled folds as `(train, validation)` index lists.
/// The first `n % k` folds hold one extra row.
pub fn kfold_indices(n: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let stop = start + size;
        let validation: Vec<usize> = (start..stop).collect();
        let train: Vec<usize> = (0..start).chain(stop..n).collect();
        folds.push((train, validation));
        start = stop;
    }
    folds
}

/// Result of a completed search
#[derive(Debug)]
pub struct SearchOutcome {
    /// Winner refit on the whole training set
    pub model: RandomForestModel,
    pub best: CandidateScore,
    /// Every candidate, in enumeration order
    pub candidates: Vec<CandidateScore>,
}

/// Grid search over random forest settings
#[derive(Debug, Clone)]
pub struct GridSearchTrainer {
    grid: ParameterGrid,
    folds: usize,
    seed: u64,
    parallel: bool,
}

impl GridSearchTrainer {
    pub fn new(grid: ParameterGrid, folds: usize, seed: u64) -> Self {
        Self {
            grid,
            folds,
            seed,
            parallel: true,
        }
    }

    /// Run jobs on the calling thread instead of the rayon pool
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn search(
        &self,
        x_train: &[FeatureVector],
        y_train: &[f64],
    ) -> Result<SearchOutcome, PipelineError> {
        let n = x_train.len();
        if n == 0 || n < self.folds || self.folds < 2 {
            return Err(PipelineError::InsufficientData {
                rows: n,
                required: self.folds.max(2),
            });
        }

        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(PipelineError::Training {
                reason: "parameter grid is empty".to_string(),
            });
        }

        info!("Training a model with hyperparameters");
        debug!("grid_space = {:?}", self.grid);
        info!(
            "GridSearch: {} candidates x {} folds on {} rows",
            candidates.len(),
            self.folds,
            n
        );

        let folds = kfold_indices(n, self.folds);
        let jobs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let run = |&(c, f): &(usize, usize)| {
            self.score_fold(candidates[c], &folds[f], x_train, y_train)
        };
        let fold_scores: Vec<Result<f64, PipelineError>> = if self.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        let mut per_candidate: Vec<Vec<f64>> = vec![Vec::with_capacity(folds.len()); candidates.len()];
        for (&(c, _), score) in jobs.iter().zip(fold_scores) {
            per_candidate[c].push(score?);
        }

        let scored: Vec<CandidateScore> = candidates
            .iter()
            .zip(per_candidate)
            .map(|(&params, scores)| CandidateScore::from_folds(params, scores))
            .collect();

        for s in &scored {
            debug!(
                "GridSearch: {} -> mean R2={:.4} (std={:.4})",
                s.params, s.mean_score, s.std_score
            );
        }

        let best = select_best(&scored).clone();
        info!(
            "GridSearch: best {} with mean R2={:.4}; refitting on full training set",
            best.params, best.mean_score
        );

        let model = RandomForestModel::fit(x_train, y_train, best.params, self.seed)?;

        Ok(SearchOutcome {
            model,
            best,
            candidates: scored,
        })
    }

    fn score_fold(
        &self,
        params: Hyperparameters,
        (train_idx, valid_idx): &(Vec<usize>, Vec<usize>),
        x: &[FeatureVector],
        y: &[f64],
    ) -> Result<f64, PipelineError> {
        let x_fit: Vec<FeatureVector> = train_idx.iter().map(|&i| x[i]).collect();
        let y_fit: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let x_val: Vec<FeatureVector> = valid_idx.iter().map(|&i| x[i]).collect();
        let y_val: Vec<f64> = valid_idx.iter().map(|&i| y[i]).collect();

        let model = RandomForestModel::fit(&x_fit, &y_fit, params, self.seed)?;
        let pred = model
            .predict_batch(&x_val)
            .map_err(|e| PipelineError::Training {
                reason: e.to_string(),
            })?;

        Ok(r2_score(&y_val, &pred))
    }
}

/// Highest mean score wins; the first candidate wins exact ties. NaN means
/// never beat anything.
fn select_best(scored: &[CandidateScore]) -> &CandidateScore {
    let mut best = &scored[0];
    for candidate in &scored[1..] {
        let score = candidate.mean_score;
        if !score.is_nan() && (best.mean_score.is_nan() || score > best.mean_score) {
            best = candidate;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(n_estimators: usize, max_depth: u16, mean: f64) -> CandidateScore {
        CandidateScore {
            params: Hyperparameters {
                n_estimators,
                max_depth,
            },
            fold_scores: vec![mean],
            mean_score: mean,
            std_score: 0.0,
        }
    }

    fn synthetic(n: usize) -> (Vec<FeatureVector>, Vec<f64>) {
        let x: Vec<FeatureVector> = (0..n)
            .map(|i| {
                FeatureVector::from_fn(|f| match f.index() {
                    0 => 30.0 + (i % 17) as f64 * 5.0,
                    1 => 1950.0 + (i % 23) as f64 * 3.0,
                    2 => (i % 4) as f64 + 1.0,
                    3 => (i % 3) as f64 * 10.0,
                    k => ((i + k) % 2) as f64,
                })
            })
            .collect();
        let y = x
            .iter()
            .map(|v| v.as_slice()[0] * 20.0 + v.as_slice()[2] * 50.0 + v.as_slice()[4] * 100.0)
            .collect();
        (x, y)
    }

    #[test]
    fn test_default_grid_has_twelve_candidates() {
        let grid = ParameterGrid::default();
        let candidates = grid.candidates();

        assert_eq!(candidates.len(), 12);
        assert_eq!(
            candidates[0],
            Hyperparameters {
                n_estimators: 100,
                max_depth: 3
            }
        );
        assert_eq!(
            candidates[1],
            Hyperparameters {
                n_estimators: 200,
                max_depth: 3
            }
        );
        assert_eq!(
            candidates[11],
            Hyperparameters {
                n_estimators: 300,
                max_depth: 12
            }
        );
    }

    #[test]
    fn test_kfold_sizes_and_coverage() {
        let folds = kfold_indices(12, 5);
        let sizes: Vec<usize> = folds.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        let mut seen: Vec<usize> = folds.iter().flat_map(|(_, v)| v.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..12).collect::<Vec<_>>());

        for (train, valid) in &folds {
            assert_eq!(train.len() + valid.len(), 12);
            assert!(valid.iter().all(|i| !train.contains(i)));
        }
    }

    #[test]
    fn test_select_best_prefers_first_on_tie() {
        let scored = vec![score(100, 3, 0.5), score(200, 3, 0.8), score(300, 3, 0.8)];
        assert_eq!(select_best(&scored).params.n_estimators, 200);
    }

    #[test]
    fn test_select_best_skips_nan() {
        let scored = vec![score(100, 3, f64::NAN), score(200, 3, 0.1)];
        assert_eq!(select_best(&scored).params.n_estimators, 200);
    }

    #[test]
    fn test_too_few_rows_rejected() {
        let (x, y) = synthetic(4);
        let trainer = GridSearchTrainer::new(ParameterGrid::default(), 5, 0);

        let err = trainer.search(&x, &y).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientData {
                rows: 4,
                required: 5
            }
        ));
        assert!(trainer.search(&[], &[]).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (x, y) = synthetic(60);
        let grid = ParameterGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![2, 4],
        };

        let parallel = GridSearchTrainer::new(grid.clone(), 3, 11)
            .search(&x, &y)
            .unwrap();
        let sequential = GridSearchTrainer::new(grid, 3, 11)
            .sequential()
            .search(&x, &y)
            .unwrap();

        assert_eq!(parallel.best, sequential.best);
        assert_eq!(parallel.candidates, sequential.candidates);
        assert_eq!(parallel.candidates.len(), 4);
        assert_eq!(parallel.best.fold_scores.len(), 3);
    }

    #[test]
    fn test_grid_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.toml");
        std::fs::write(&path, "n_estimators = [10, 20]\nmax_depth = [4]\n").unwrap();

        let grid = ParameterGrid::load(&path).unwrap();
        assert_eq!(grid.n_estimators, vec![10, 20]);
        assert_eq!(grid.max_depth, vec![4]);

        std::fs::write(&path, "n_estimators = []\nmax_depth = [4]\n").unwrap();
        assert!(ParameterGrid::load(&path).is_err());
    }
}

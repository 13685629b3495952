use crate::domain::errors::PipelineError;
use crate::domain::ml::FeatureVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Train/test partition of an encoded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Vec<FeatureVector>,
    pub x_test: Vec<FeatureVector>,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

/// Uniform random hold-out split. The same seed always yields the same split.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSplitter {
    test_fraction: f64,
    seed: u64,
}

impl DatasetSplitter {
    pub fn new(test_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            seed,
        }
    }

    /// Number of rows held out for testing, rounded up.
    pub fn test_size(&self, n: usize) -> usize {
        ((n as f64) * self.test_fraction).ceil() as usize
    }

    pub fn split(
        &self,
        features: &[FeatureVector],
        target: &[f64],
    ) -> Result<TrainTestSplit, PipelineError> {
        if features.len() != target.len() {
            return Err(PipelineError::Encoding {
                reason: format!(
                    "{} feature rows but {} target values",
                    features.len(),
                    target.len()
                ),
            });
        }

        let n = features.len();
        let n_test = self.test_size(n).min(n);
        if n == 0 || n_test == n {
            return Err(PipelineError::InsufficientData {
                rows: n,
                required: n_test + 1,
            });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        info!(
            "Splitting {} rows into {} train / {} test (seed={})",
            n,
            train_idx.len(),
            test_idx.len(),
            self.seed
        );

        Ok(TrainTestSplit {
            x_train: train_idx.iter().map(|&i| features[i]).collect(),
            x_test: test_idx.iter().map(|&i| features[i]).collect(),
            y_train: train_idx.iter().map(|&i| target[i]).collect(),
            y_test: test_idx.iter().map(|&i| target[i]).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Vec<FeatureVector>, Vec<f64>) {
        let x = (0..n)
            .map(|i| FeatureVector::from_fn(|_| i as f64))
            .collect();
        let y = (0..n).map(|i| i as f64 * 10.0).collect();
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = dataset(11);
        let split = DatasetSplitter::new(0.2, 7).split(&x, &y).unwrap();

        // ceil(11 * 0.2) = 3
        assert_eq!(split.x_test.len(), 3);
        assert_eq!(split.x_train.len(), 8);
        assert_eq!(split.y_test.len(), 3);
        assert_eq!(split.y_train.len(), 8);
    }

    #[test]
    fn test_split_keeps_rows_aligned() {
        let (x, y) = dataset(20);
        let split = DatasetSplitter::new(0.2, 1).split(&x, &y).unwrap();

        for (xv, yv) in split.x_train.iter().zip(&split.y_train) {
            assert_eq!(xv.as_slice()[0] * 10.0, *yv);
        }
        let mut all: Vec<f64> = split.y_train.iter().chain(&split.y_test).copied().collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(all, y);
    }

    #[test]
    fn test_same_seed_same_split() {
        let (x, y) = dataset(50);
        let a = DatasetSplitter::new(0.2, 42).split(&x, &y).unwrap();
        let b = DatasetSplitter::new(0.2, 42).split(&x, &y).unwrap();
        let c = DatasetSplitter::new(0.2, 43).split(&x, &y).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.y_test, c.y_test);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = DatasetSplitter::new(0.2, 0).split(&[], &[]).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { rows: 0, .. }));

        // A single row would leave nothing to train on
        let (x, y) = dataset(1);
        assert!(DatasetSplitter::new(0.2, 0).split(&x, &y).is_err());
    }
}

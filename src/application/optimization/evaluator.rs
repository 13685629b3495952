use crate::application::ml::predictor::PricePredictor;
use crate::domain::errors::PipelineError;
use crate::domain::ml::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Coefficient of determination.
///
/// With a constant target the score is 1.0 for a perfect fit and 0.0
/// otherwise, so the result is always finite for finite inputs.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }

    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Held-out performance of a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub samples: usize,
}

/// Scores a model on test data. It never rejects a model; the score is
/// reported and the caller persists the model regardless.
pub struct ModelEvaluator;

impl ModelEvaluator {
    pub fn evaluate(
        model: &dyn PricePredictor,
        x_test: &[FeatureVector],
        y_test: &[f64],
    ) -> Result<EvaluationReport, PipelineError> {
        let pred = model
            .predict_batch(x_test)
            .map_err(|e| PipelineError::Training {
                reason: e.to_string(),
            })?;

        let n = pred.len().max(1) as f64;
        let sq_err: f64 = pred
            .iter()
            .zip(y_test)
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        let abs_err: f64 = pred.iter().zip(y_test).map(|(p, t)| (p - t).abs()).sum();

        let report = EvaluationReport {
            r2: r2_score(y_test, &pred),
            rmse: (sq_err / n).sqrt(),
            mae: abs_err / n,
            samples: pred.len(),
        };

        info!(
            "Evaluating model performance. SCORE={:.4} (RMSE={:.2}, MAE={:.2}, n={})",
            report.r2, report.rmse, report.mae, report.samples
        );
        if report.r2 < 0.0 {
            warn!("Model scores below a constant predictor on the test set; it will still be saved");
        }

        Ok(report)
    }
}

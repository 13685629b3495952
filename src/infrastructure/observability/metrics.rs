//! Prometheus metrics definitions for the inference service
//!
//! All metrics use the `rentwise_` prefix.

use prometheus::{CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the prediction API
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions by outcome (ok, invalid, error, timeout)
    pub predictions_total: CounterVec,
    /// Model call latency in seconds
    pub prediction_latency_seconds: Histogram,
    /// Test-set R2 of the loaded model
    pub model_test_score: Gauge,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("rentwise_predictions_total", "Total predictions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "rentwise_prediction_latency_seconds",
                "Model prediction latency in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let model_test_score = Gauge::with_opts(Opts::new(
            "rentwise_model_test_score",
            "Held-out R2 of the loaded model",
        ))?;
        registry.register(Box::new(model_test_score.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_latency_seconds,
            model_test_score,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Increment prediction counter
    pub fn inc_predictions(&self, outcome: &str) {
        self.predictions_total.with_label_values(&[outcome]).inc();
    }

    /// Observe model latency
    pub fn observe_latency(&self, seconds: f64) {
        self.prediction_latency_seconds.observe(seconds);
    }
}

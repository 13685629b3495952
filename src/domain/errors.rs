use std::path::PathBuf;
use thiserror::Error;

/// Garden text that is neither the sentinel nor contains a digit run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot parse garden size from {value:?}: no digits and not 'Not present'")]
pub struct GardenParseError {
    pub value: String,
}

/// Errors raised by the offline training pipeline and the model registry
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load data from {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("Row {row}: {error}")]
    Parse { row: usize, error: GardenParseError },

    #[error("Encoding failed: {reason}")]
    Encoding { reason: String },

    #[error("Insufficient data: {rows} rows available, at least {required} required")]
    InsufficientData { rows: usize, required: usize },

    #[error("Estimator failure: {reason}")]
    Training { reason: String },

    #[error("Failed to write model artifact to {path:?}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    #[error("Failed to read model artifact from {path:?}: {reason}")]
    Deserialization { path: PathBuf, reason: String },
}

/// A single field that failed request validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Inbound request does not match the apartment schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bad input params: {}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from invoking a loaded model
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model prediction failed: {reason}")]
    Model { reason: String },

    #[error("Prediction exceeded its budget of {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Anything that can go wrong serving one prediction
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_formatting() {
        let error = ValidationError {
            issues: vec![
                FieldIssue {
                    field: "bedrooms".to_string(),
                    message: "field is required".to_string(),
                },
                FieldIssue {
                    field: "balcony".to_string(),
                    message: "expected \"yes\" or \"no\"".to_string(),
                },
            ],
        };

        let msg = error.to_string();
        assert!(msg.starts_with("Bad input params"));
        assert!(msg.contains("bedrooms: field is required"));
        assert!(msg.contains("balcony"));
    }

    #[test]
    fn test_pipeline_error_formatting() {
        let error = PipelineError::InsufficientData {
            rows: 3,
            required: 5,
        };

        let msg = error.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('5'));

        let parse = PipelineError::Parse {
            row: 7,
            error: GardenParseError {
                value: "large".to_string(),
            },
        };
        assert!(parse.to_string().contains("Row 7"));
        assert!(parse.to_string().contains("large"));
    }
}

use crate::domain::apartment::RawRecord;
use crate::domain::errors::PipelineError;
use crate::domain::ports::ApartmentSource;
use async_trait::async_trait;

/// Serves a fixed set of records; used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApartmentSource {
    records: Vec<RawRecord>,
    failure: Option<String>,
}

impl InMemoryApartmentSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            failure: None,
        }
    }

    /// A source whose every load fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

#[async_trait]
impl ApartmentSource for InMemoryApartmentSource {
    async fn load_all(&self) -> Result<Vec<RawRecord>, PipelineError> {
        match &self.failure {
            Some(reason) => Err(PipelineError::DataLoad {
                source_name: self.describe(),
                reason: reason.clone(),
            }),
            None => Ok(self.records.clone()),
        }
    }

    fn describe(&self) -> String {
        format!("memory:{} rows", self.records.len())
    }
}

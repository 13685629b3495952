use crate::domain::apartment::RawRecord;
use crate::domain::errors::PipelineError;
use crate::domain::ports::ApartmentSource;
use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads apartments from a delimited file with a header row.
#[derive(Debug, Clone)]
pub struct CsvApartmentSource {
    path: PathBuf,
}

impl CsvApartmentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking read of every row.
    pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, PipelineError> {
        let load_err = |reason: String| PipelineError::DataLoad {
            source_name: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| load_err(e.to_string()))?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (line, result) in rdr.deserialize::<RawRecord>().enumerate() {
            // +2: header row and 1-based numbering
            let record = result.map_err(|e| load_err(format!("line {}: {}", line + 2, e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl ApartmentSource for CsvApartmentSource {
    async fn load_all(&self) -> Result<Vec<RawRecord>, PipelineError> {
        info!("Loading data from {}", self.path.display());
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_records(&path))
            .await
            .map_err(|e| PipelineError::DataLoad {
                source_name: self.describe(),
                reason: e.to_string(),
            })?
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

//! Training data location, parsed from environment variables.

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the training pipeline reads apartments from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Csv,
    Database,
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(DataSourceKind::Csv),
            "database" | "db" | "sqlite" => Ok(DataSourceKind::Database),
            _ => anyhow::bail!("Invalid DATA_SOURCE: {}. Must be 'csv' or 'database'", s),
        }
    }
}

/// Data environment configuration
#[derive(Debug, Clone)]
pub struct DataEnvConfig {
    pub source: DataSourceKind,
    pub file_name: PathBuf,
    pub database_path: String,
    pub table_name: String,
}

impl DataEnvConfig {
    pub fn from_env() -> Result<Self> {
        let source = env::var("DATA_SOURCE")
            .unwrap_or_else(|_| "csv".to_string())
            .parse::<DataSourceKind>()?;

        Ok(Self {
            source,
            file_name: env::var("DATA_FILE_NAME")
                .unwrap_or_else(|_| "data/rent_apartments.csv".to_string())
                .into(),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "sqlite://data/rent_apartments.db".to_string()),
            table_name: env::var("DATA_TABLE_NAME")
                .unwrap_or_else(|_| "rent_apartments".to_string()),
        })
    }
}

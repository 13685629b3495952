//! Rent model training CLI
//!
//! `train` runs the grid search and writes the model artifact;
//! `import-db` loads the raw CSV into the SQLite table used by
//! `DATA_SOURCE=database`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rentwise::application::optimization::grid_search::ParameterGrid;
use rentwise::application::training::TrainingPipeline;
use rentwise::config::{Config, DataEnvConfig, DataSourceKind};
use rentwise::domain::ports::ApartmentSource;
use rentwise::infrastructure::csv_source::CsvApartmentSource;
use rentwise::infrastructure::observability::init_tracing;
use rentwise::infrastructure::persistence::database::{Database, SqliteApartmentSource};
use rentwise::infrastructure::persistence::model_registry::ModelRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};

#[derive(Parser)]
#[command(author, version, about = "Apartment rent model trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search hyperparameters, evaluate, and save the best model
    Train {
        /// TOML file with `n_estimators` and `max_depth` arrays
        #[arg(long)]
        grid_config: Option<PathBuf>,

        /// Seed for the split and the forests (overrides TRAINING_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create or replace the SQLite apartments table from a CSV file
    ImportDb {
        /// CSV to import (defaults to DATA_FILE_NAME)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(Level::INFO);

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Train { grid_config, seed } => {
            if let Some(seed) = seed {
                config.model.seed = seed;
            }
            let grid = match grid_config {
                Some(path) => ParameterGrid::load(&path)?,
                None => ParameterGrid::default(),
            };

            let source = open_source(&config.data).await?;
            let store = Arc::new(ModelRegistry::new(config.model.artifact_path()));
            let summary = TrainingPipeline::from_config(&config.model, grid, source, store)
                .run()
                .await
                .context("Training failed")?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::ImportDb { csv } => {
            let path = csv.unwrap_or_else(|| config.data.file_name.clone());
            let records = CsvApartmentSource::new(&path).load_all().await?;

            let db = Database::new(&config.data.database_path).await?;
            let table = SqliteApartmentSource::new(&db, &config.data.table_name)?;
            let rows = table.replace_all(&records).await?;
            info!(
                "Imported {} rows from {} into {}",
                rows,
                path.display(),
                config.data.table_name
            );
        }
    }

    Ok(())
}

async fn open_source(data: &DataEnvConfig) -> Result<Arc<dyn ApartmentSource>> {
    Ok(match data.source {
        DataSourceKind::Csv => Arc::new(CsvApartmentSource::new(&data.file_name)),
        DataSourceKind::Database => {
            let db = Database::new(&data.database_path).await?;
            Arc::new(SqliteApartmentSource::new(&db, &data.table_name)?)
        }
    })
}

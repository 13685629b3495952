use crate::domain::apartment::RawRecord;
use crate::domain::errors::PipelineError;
use crate::domain::ports::ApartmentSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

pub const DEFAULT_TABLE: &str = "rent_apartments";

/// SQLite connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        Ok(Self { pool })
    }
}

/// Apartment table queried wholesale.
pub struct SqliteApartmentSource {
    pool: SqlitePool,
    table: String,
}

impl SqliteApartmentSource {
    /// The table name is interpolated into SQL, so only `[A-Za-z0-9_]` is accepted.
    pub fn new(database: &Database, table: &str) -> Result<Self> {
        let valid = !table.is_empty()
            && !table.starts_with(|c: char| c.is_ascii_digit())
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            anyhow::bail!("Invalid table name: {:?}", table);
        }

        Ok(Self {
            pool: database.pool.clone(),
            table: table.to_string(),
        })
    }

    /// Replace the table with `records`, in one transaction.
    pub async fn replace_all(&self, records: &[RawRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&mut *tx)
            .await
            .context("Failed to drop apartments table")?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE {} (
                area REAL NOT NULL,
                constraction_year REAL NOT NULL,
                bedrooms REAL NOT NULL,
                garden TEXT NOT NULL,
                balcony TEXT NOT NULL,
                parking TEXT NOT NULL,
                furnished TEXT NOT NULL,
                garage TEXT NOT NULL,
                storage TEXT NOT NULL,
                rent REAL NOT NULL
            );
            "#,
            self.table
        ))
        .execute(&mut *tx)
        .await
        .context("Failed to create apartments table")?;

        let insert = format!(
            r#"
            INSERT INTO {} (area, constraction_year, bedrooms, garden, balcony,
                            parking, furnished, garage, storage, rent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            self.table
        );
        for r in records {
            sqlx::query(&insert)
                .bind(r.area)
                .bind(r.constraction_year)
                .bind(r.bedrooms)
                .bind(&r.garden)
                .bind(&r.balcony)
                .bind(&r.parking)
                .bind(&r.furnished)
                .bind(&r.garage)
                .bind(&r.storage)
                .bind(r.rent)
                .execute(&mut *tx)
                .await
                .context("Failed to insert apartment row")?;
        }

        tx.commit().await?;
        info!("Table {} created with {} rows", self.table, records.len());
        Ok(records.len())
    }

    async fn fetch_all(&self) -> Result<Vec<RawRecord>> {
        let rows = sqlx::query(&format!("SELECT * FROM {}", self.table))
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(RawRecord {
                area: row.try_get("area")?,
                constraction_year: row.try_get("constraction_year")?,
                bedrooms: row.try_get("bedrooms")?,
                garden: row.try_get("garden")?,
                balcony: row.try_get("balcony")?,
                parking: row.try_get("parking")?,
                furnished: row.try_get("furnished")?,
                garage: row.try_get("garage")?,
                storage: row.try_get("storage")?,
                rent: row.try_get("rent")?,
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl ApartmentSource for SqliteApartmentSource {
    async fn load_all(&self) -> Result<Vec<RawRecord>, PipelineError> {
        info!("Loading data from SQLite table {}", self.table);
        self.fetch_all()
            .await
            .map_err(|e| PipelineError::DataLoad {
                source_name: self.describe(),
                reason: format!("{:#}", e),
            })
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_db(dir: &tempfile::TempDir) -> Database {
        let url = format!("sqlite://{}", dir.path().join("apartments.db").display());
        Database::new(&url).await.unwrap()
    }

    fn record(area: f64, garden: &str) -> RawRecord {
        RawRecord {
            area,
            constraction_year: 1990.0,
            bedrooms: 2.0,
            garden: garden.to_string(),
            balcony: "yes".to_string(),
            parking: "no".to_string(),
            furnished: "no".to_string(),
            garage: "yes".to_string(),
            storage: "no".to_string(),
            rent: 1000.0 + area,
        }
    }

    #[tokio::test]
    async fn test_replace_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        let source = SqliteApartmentSource::new(&db, DEFAULT_TABLE).unwrap();

        let rows = vec![record(40.0, "Not present"), record(65.0, "20m2")];
        assert_eq!(source.replace_all(&rows).await.unwrap(), 2);
        // Second import replaces rather than appends
        source.replace_all(&rows).await.unwrap();

        let loaded = source.load_all().await.unwrap();
        assert_eq!(loaded, rows);
    }

    #[tokio::test]
    async fn test_missing_table_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        let source = SqliteApartmentSource::new(&db, "nothing_here").unwrap();

        let err = source.load_all().await.unwrap_err();
        assert!(matches!(err, PipelineError::DataLoad { .. }));
    }

    #[tokio::test]
    async fn test_table_name_validation() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        assert!(SqliteApartmentSource::new(&db, "apartments; DROP TABLE x").is_err());
        assert!(SqliteApartmentSource::new(&db, "1table").is_err());
        assert!(SqliteApartmentSource::new(&db, "rent_2024").is_ok());
    }
}

//! Configuration module for Rentwise.
//!
//! Structured configuration loaded from environment variables (and `.env`),
//! organized by concern: Data, Model, and Server.

mod data_config;
mod model_config;
mod server_config;

pub use data_config::{DataEnvConfig, DataSourceKind};
pub use model_config::ModelEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataEnvConfig,
    pub model: ModelEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from `.env` (if present) and the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data = DataEnvConfig::from_env().context("Failed to load data config")?;
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;

        Ok(Self {
            data,
            model,
            server,
        })
    }
}

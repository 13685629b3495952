//! HTTP server configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    pub predict_timeout_ms: u64,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            predict_timeout_ms: 2000,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: env::var("SERVER_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("Failed to parse SERVER_PORT")?,
            predict_timeout_ms: env::var("PREDICT_TIMEOUT_MS")
                .unwrap_or_else(|_| defaults.predict_timeout_ms.to_string())
                .parse::<u64>()
                .context("Failed to parse PREDICT_TIMEOUT_MS")?,
        })
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }
}

//! HTTP request handlers for Oraclescope

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{LcdClient, OracleReader};
use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod health;
pub mod oracle;

/// Application state shared across all handlers
///
/// Holds the configuration and the chain reader. Both are Arc'd for cheap
/// cloning across Axum handlers; nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    reader: Arc<dyn OracleReader>,
}

impl AppState {
    /// Create state with a REST-backed chain reader built from the config
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.node.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("could not build HTTP client: {e}")))?;

        let reader: Arc<dyn OracleReader> =
            Arc::new(LcdClient::new(config.node.address.clone(), http));

        Ok(Self { config, reader })
    }

    /// Create state around an existing chain reader
    pub fn with_reader(config: Arc<Config>, reader: Arc<dyn OracleReader>) -> Self {
        Self { config, reader }
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a handle to the chain reader
    pub fn reader(&self) -> Arc<dyn OracleReader> {
        Arc::clone(&self.reader)
    }
}

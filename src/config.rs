//! Configuration management for Oraclescope
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every setting has a default, so the exporter starts without a config file;
//! CLI flags override file values (see `cli.rs`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub node: NodeConfig,
    /// Constant labels attached to every exported metric.
    ///
    /// Threaded into the per-request metric sink at construction time; there
    /// is no process-wide label state.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:9300".to_string()
}

/// Node connection and chain-assumption configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Base URL of the node's REST (gRPC-gateway) API
    #[serde(default = "default_node_address")]
    pub address: String,
    /// Assumed seconds per block, used for the next-window ETA derivation.
    /// This is an operator assumption, not a value read from the chain.
    #[serde(default = "default_block_time")]
    pub block_time: u64,
    /// Bech32 human-readable part expected on validator operator addresses
    #[serde(default = "default_valoper_prefix")]
    pub valoper_prefix: String,
    /// Per-query timeout in seconds applied by the HTTP client
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: default_node_address(),
            block_time: default_block_time(),
            valoper_prefix: default_valoper_prefix(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_node_address() -> String {
    "http://localhost:1317".to_string()
}

fn default_block_time() -> u64 {
    5
}

fn default_valoper_prefix() -> String {
    "umeevaloper".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 3: Validate parsed config (provides contextual reason)
        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()`, but must also be called
    /// explicitly after CLI overrides are applied.
    pub fn validate(&self) -> crate::error::AppResult<()> {
        if self.server.listen_address.parse::<SocketAddr>().is_err() {
            return Err(crate::error::AppError::Config(format!(
                "server.listen_address '{}' is not a valid socket address \
                (expected host:port, e.g. '0.0.0.0:9300')",
                self.server.listen_address
            )));
        }

        if !self.node.address.starts_with("http://") && !self.node.address.starts_with("https://") {
            return Err(crate::error::AppError::Config(format!(
                "node.address '{}' must start with 'http://' or 'https://'",
                self.node.address
            )));
        }

        if self.node.block_time == 0 {
            return Err(crate::error::AppError::Config(
                "node.block_time must be greater than 0".to_string(),
            ));
        }
        if self.node.block_time > 3600 {
            return Err(crate::error::AppError::Config(format!(
                "node.block_time cannot exceed 3600 seconds, got {}",
                self.node.block_time
            )));
        }

        if self.node.valoper_prefix.is_empty() {
            return Err(crate::error::AppError::Config(
                "node.valoper_prefix must not be empty".to_string(),
            ));
        }

        if self.node.request_timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "node.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.node.request_timeout_seconds > 300 {
            return Err(crate::error::AppError::Config(format!(
                "node.request_timeout_seconds cannot exceed 300 seconds, got {}",
                self.node.request_timeout_seconds
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
[server]
listen_address = "127.0.0.1:9300"

[node]
address = "https://api.mainnet.network:443"
block_time = 6
valoper_prefix = "umeevaloper"
request_timeout_seconds = 15

[labels]
chain = "umee"
environment = "mainnet"

[observability]
log_level = "debug"
"#;

    #[test]
    fn config_from_str_parses_successfully() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.server.listen_address, "127.0.0.1:9300");
        assert_eq!(config.node.address, "https://api.mainnet.network:443");
        assert_eq!(config.node.block_time, 6);
        assert_eq!(config.node.valoper_prefix, "umeevaloper");
        assert_eq!(config.node.request_timeout_seconds, 15);
    }

    #[test]
    fn config_parses_const_labels() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.labels.get("chain").map(String::as_str), Some("umee"));
        assert_eq!(
            config.labels.get("environment").map(String::as_str),
            Some("mainnet")
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_str("").expect("empty config should be valid");
        assert_eq!(config.server.listen_address, "0.0.0.0:9300");
        assert_eq!(config.node.address, "http://localhost:1317");
        assert_eq!(config.node.block_time, 5);
        assert_eq!(config.node.valoper_prefix, "umeevaloper");
        assert_eq!(config.node.request_timeout_seconds, 10);
        assert!(config.labels.is_empty());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn validation_rejects_bad_listen_address() {
        let mut config = Config::default();
        config.server.listen_address = "not-an-address".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("listen_address"));
    }

    #[test]
    fn validation_rejects_node_address_without_scheme() {
        let mut config = Config::default();
        config.node.address = "localhost:1317".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("node.address"));
        assert!(err_msg.contains("http"));
    }

    #[test]
    fn validation_rejects_zero_block_time() {
        let mut config = Config::default();
        config.node.block_time = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("block_time"));
    }

    #[test]
    fn validation_rejects_excessive_block_time() {
        let mut config = Config::default();
        config.node.block_time = 3601;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("3600"));
    }

    #[test]
    fn validation_rejects_empty_valoper_prefix() {
        let mut config = Config::default();
        config.node.valoper_prefix = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("valoper_prefix"));
    }

    #[test]
    fn validation_rejects_zero_timeout() {
        let mut config = Config::default();
        config.node.request_timeout_seconds = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("request_timeout_seconds")
        );
    }

    #[test]
    fn validation_accepts_boundary_timeouts() {
        let mut config = Config::default();
        config.node.request_timeout_seconds = 1;
        assert!(config.validate().is_ok());

        config.node.request_timeout_seconds = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_str_rejects_invalid_toml() {
        let result = Config::from_str("[node\naddress = 1317");
        assert!(result.is_err());
    }
}

//! Command-line interface for Oraclescope
//!
//! Provides argument parsing for the Oraclescope binary. Every flag mirrors a
//! config-file setting; flags given on the command line win over file values.

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Oracle-voting health exporter for Cosmos validators
#[derive(Parser)]
#[command(name = "oraclescope")]
#[command(version)]
#[command(about = "Oracle-voting health exporter for Cosmos validators")]
#[command(
    long_about = "Oraclescope answers Prometheus scrapes with a per-validator snapshot of \
    oracle-voting health: slash-window progress, miss counter and rate, feeder delegation, \
    last prevote height, and per-asset vote coverage."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Address the exporter listens on (overrides server.listen_address)
    #[arg(long)]
    pub listen_address: Option<String>,

    /// Base URL of the node's REST API (overrides node.address)
    #[arg(long)]
    pub node: Option<String>,

    /// Assumed block time in seconds (overrides node.block_time)
    #[arg(long)]
    pub block_time: Option<u64>,

    /// Expected bech32 prefix of validator operator addresses
    #[arg(long)]
    pub valoper_prefix: Option<String>,

    /// Logging level (overrides observability.log_level)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(listen_address) = &self.listen_address {
            config.server.listen_address = listen_address.clone();
        }
        if let Some(node) = &self.node {
            config.node.address = node.clone();
        }
        if let Some(block_time) = self.block_time {
            config.node.block_time = block_time;
        }
        if let Some(prefix) = &self.valoper_prefix {
            config.node.valoper_prefix = prefix.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.observability.log_level = log_level.clone();
        }
    }
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Oraclescope Configuration
# =========================
#
# This file configures the HTTP listener, the node connection, the constant
# labels stamped on every metric, and logging.

[server]
# Address the exporter listens on
listen_address = "0.0.0.0:9300"

[node]
# Base URL of the node's REST (gRPC-gateway) API
address = "http://localhost:1317"

# Assumed seconds per block, used to estimate the next slash-window start.
# This is an operator assumption, not a value read from the chain.
block_time = 5

# Bech32 prefix expected on validator operator addresses
valoper_prefix = "umeevaloper"

# Per-query timeout in seconds for node reads
request_timeout_seconds = 10

# Constant labels attached to every exported metric (optional)
[labels]
# chain = "umee"
# environment = "mainnet"

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}

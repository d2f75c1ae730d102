//! Chain Reader - read-only queries against a node's oracle module
//!
//! Each query is independent, idempotent and side-effect-free on the node.
//! Failures are reported, never retried internally; retry policy belongs to
//! the caller (none is applied in this exporter).

use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::LcdClient;
pub use types::{
    AcceptedAsset, AggregatePrevote, AggregateVote, ExchangeRateTuple, OracleParams,
    SlashWindowState,
};

use thiserror::Error;

/// A remote read failure
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("node returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ChainError {
    /// Whether the node answered but reported the record as unavailable.
    ///
    /// The oracle module answers with an error status when a validator has
    /// no prevote or vote on record, which is a legitimate state rather than
    /// a degraded read. Transport and decode failures are never absence.
    pub fn is_absence(&self) -> bool {
        matches!(self, ChainError::Status { .. })
    }
}

/// Read-only access to the oracle module of a blockchain node
///
/// One method per remote read. Implementations must not share mutable state
/// across concurrent invocations; every call stands alone.
#[async_trait]
pub trait OracleReader: Send + Sync {
    /// Current slash-window progress (blocks elapsed in the current window)
    async fn slash_window(&self) -> Result<SlashWindowState, ChainError>;

    /// Oracle module parameters
    async fn params(&self) -> Result<OracleParams, ChainError>;

    /// Missed-vote counter for a validator in the current window
    async fn miss_counter(&self, valoper: &str) -> Result<u64, ChainError>;

    /// Address the validator has delegated vote submission to
    async fn feeder_delegation(&self, valoper: &str) -> Result<String, ChainError>;

    /// The validator's last submitted aggregate prevote
    async fn aggregate_prevote(&self, valoper: &str) -> Result<AggregatePrevote, ChainError>;

    /// The validator's last submitted aggregate vote
    async fn aggregate_vote(&self, valoper: &str) -> Result<AggregateVote, ChainError>;
}

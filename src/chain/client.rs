//! REST-backed implementation of the Chain Reader
//!
//! Talks to the node's gRPC-gateway endpoints for the oracle module. The
//! underlying `reqwest::Client` pools connections, but every logical read is
//! an independent GET with no state shared between concurrent calls.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{
    AggregatePrevote, AggregatePrevoteResponse, AggregateVote, AggregateVoteResponse,
    FeederDelegationResponse, MissCounterResponse, OracleParams, ParamsResponse, SlashWindowState,
};
use super::{ChainError, OracleReader};

/// Oracle reader over the node's REST API
#[derive(Clone)]
pub struct LcdClient {
    http: reqwest::Client,
    base_url: String,
}

impl LcdClient {
    /// Create a client for the node at `base_url` (e.g. `http://localhost:1317`)
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let url = format!("{}{}", self.base_url, path);

        let response =
            self.http
                .get(&url)
                .send()
                .await
                .map_err(|source| ChainError::Transport {
                    url: url.clone(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Status { url, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ChainError::Decode { url, source })
    }
}

#[async_trait]
impl OracleReader for LcdClient {
    async fn slash_window(&self) -> Result<SlashWindowState, ChainError> {
        self.get_json("/umee/oracle/v1/slash_window").await
    }

    async fn params(&self) -> Result<OracleParams, ChainError> {
        let response: ParamsResponse = self.get_json("/umee/oracle/v1/params").await?;
        Ok(response.params)
    }

    async fn miss_counter(&self, valoper: &str) -> Result<u64, ChainError> {
        let response: MissCounterResponse = self
            .get_json(&format!("/umee/oracle/v1/validators/{valoper}/miss"))
            .await?;
        Ok(response.miss_counter)
    }

    async fn feeder_delegation(&self, valoper: &str) -> Result<String, ChainError> {
        let response: FeederDelegationResponse = self
            .get_json(&format!("/umee/oracle/v1/validators/{valoper}/feeder"))
            .await?;
        Ok(response.feeder_addr)
    }

    async fn aggregate_prevote(&self, valoper: &str) -> Result<AggregatePrevote, ChainError> {
        let response: AggregatePrevoteResponse = self
            .get_json(&format!(
                "/umee/oracle/v1/validators/{valoper}/aggregate_prevote"
            ))
            .await?;
        Ok(response.aggregate_prevote)
    }

    async fn aggregate_vote(&self, valoper: &str) -> Result<AggregateVote, ChainError> {
        let response: AggregateVoteResponse = self
            .get_json(&format!(
                "/umee/oracle/v1/validators/{valoper}/aggregate_vote"
            ))
            .await?;
        Ok(response.aggregate_vote)
    }
}

//! Response types for the oracle module REST API
//!
//! The node's gRPC-gateway encodes 64-bit integers and Dec values as JSON
//! strings ("100800", "0.050000000000000000"), so the numeric fields here
//! carry dedicated string-decoding deserializers. Unknown fields in node
//! responses are ignored.

use serde::{Deserialize, Deserializer};

/// Foundation entity: progress of the current slash window
#[derive(Debug, Clone, Deserialize)]
pub struct SlashWindowState {
    /// Blocks elapsed in the current window
    #[serde(deserialize_with = "string_u64")]
    pub window_progress: u64,
}

/// Foundation entity: oracle module parameters
#[derive(Debug, Clone, Deserialize)]
pub struct OracleParams {
    /// Number of blocks between required price submissions
    #[serde(deserialize_with = "string_u64")]
    pub vote_period: u64,
    /// Number of blocks over which vote misses accumulate toward slashing
    #[serde(deserialize_with = "string_u64")]
    pub slash_window: u64,
    /// Fraction of valid votes required per window to avoid slashing
    #[serde(deserialize_with = "string_f64")]
    pub min_valid_per_window: f64,
    /// Stake fraction slashed when the minimum is not met
    #[serde(deserialize_with = "string_f64")]
    pub slash_fraction: f64,
    /// Assets the oracle expects price votes for
    #[serde(default)]
    pub accept_list: Vec<AcceptedAsset>,
}

/// One entry of the oracle accept list
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptedAsset {
    pub base_denom: String,
    pub symbol_denom: String,
}

/// The validator's last submitted aggregate prevote
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatePrevote {
    pub hash: String,
    /// Height the prevote was submitted at
    #[serde(deserialize_with = "string_u64")]
    pub submit_block: u64,
    pub voter: String,
}

/// The validator's last submitted aggregate vote
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateVote {
    #[serde(default)]
    pub exchange_rate_tuples: Vec<ExchangeRateTuple>,
    pub voter: String,
}

/// One (asset, exchange rate) pair inside an aggregate vote
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateTuple {
    pub denom: String,
    pub exchange_rate: String,
}

// Response envelopes, private to the chain module: the REST API wraps most
// payloads in a single-field object.

#[derive(Debug, Deserialize)]
pub(crate) struct ParamsResponse {
    pub params: OracleParams,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MissCounterResponse {
    #[serde(deserialize_with = "string_u64")]
    pub miss_counter: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeederDelegationResponse {
    pub feeder_addr: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregatePrevoteResponse {
    pub aggregate_prevote: AggregatePrevote,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateVoteResponse {
    pub aggregate_vote: AggregateVote,
}

fn string_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<u64>().map_err(serde::de::Error::custom)
}

fn string_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

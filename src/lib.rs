//! Oraclescope - oracle-voting health exporter for Cosmos validators
//!
//! Answers one request type: "give me the current oracle-voting health of
//! validator V". Each request fans out read-only queries against a node's
//! oracle module, derives secondary indicators (miss rate, next-window ETA,
//! per-asset vote coverage) and renders the result as a Prometheus text
//! exposition. Nothing is cached across requests.

pub mod address;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod snapshot;
pub mod telemetry;

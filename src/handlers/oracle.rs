//! Oracle snapshot endpoint
//!
//! `GET /metrics/general?valoper=<address>` - assembles a fresh oracle-voting
//! snapshot for one validator and returns it as a Prometheus text exposition.
//!
//! Failure surface, per the collection contract:
//! - malformed address: 400 before any node read
//! - foundation read failure: 502 with an empty body
//! - per-validator read failure: 200 with the affected metrics absent

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::address::ValoperAddress;
use crate::error::AppError;
use crate::handlers::AppState;
use crate::snapshot::{MetricSink, SnapshotAssembler};

/// Query parameters for the snapshot endpoint
#[derive(Debug, Deserialize)]
pub struct OracleQuery {
    pub valoper: String,
}

/// Snapshot handler
pub async fn handler(State(state): State<AppState>, Query(query): Query<OracleQuery>) -> Response {
    let request_start = Instant::now();

    let valoper = match ValoperAddress::parse(&query.valoper, &state.config().node.valoper_prefix)
    {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(
                valoper = %query.valoper,
                error = %e,
                "Could not get validator address"
            );
            return AppError::from(e).into_response();
        }
    };

    let sink = match MetricSink::new(state.config().labels.clone()) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::error!(error = %e, "Could not register snapshot gauges");
            return AppError::from(e).into_response();
        }
    };

    let assembler = SnapshotAssembler::new(state.reader(), state.config().node.block_time);
    if let Err(e) = assembler.collect(&valoper, &sink).await {
        // Foundation failure: the whole snapshot is aborted, no partial body.
        return AppError::from(e).into_response();
    }

    match sink.render() {
        Ok(body) => {
            tracing::info!(
                method = "GET",
                endpoint = %format!("/metrics/general?valoper={valoper}"),
                request_time = request_start.elapsed().as_secs_f64(),
                "Request processed"
            );
            ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not render exposition");
            AppError::from(e).into_response()
        }
    }
}

//! Snapshot assembly - per-request collection and derivation
//!
//! One `SnapshotAssembler::collect` call services one scrape. Two foundation
//! reads run sequentially (their results gate everything downstream), then
//! four per-validator reads run as independent tasks on the runtime pool.
//! A failing per-validator task only withholds its own metrics; a failing
//! foundation read aborts the whole snapshot.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::address::ValoperAddress;
use crate::chain::{AcceptedAsset, ChainError, OracleReader};

pub mod derive;
pub mod sink;

pub use sink::MetricSink;

/// Orchestrates the reads and derivations for one snapshot
pub struct SnapshotAssembler {
    reader: Arc<dyn OracleReader>,
    block_time: u64,
}

impl SnapshotAssembler {
    /// Create an assembler over a chain reader
    ///
    /// `block_time` is the assumed seconds per block used for the
    /// next-window estimate.
    pub fn new(reader: Arc<dyn OracleReader>, block_time: u64) -> Self {
        Self { reader, block_time }
    }

    /// Collect a full snapshot for `valoper` into `sink`
    ///
    /// Returns `Err` only when a foundation read fails; the caller must then
    /// discard the sink. Per-validator read failures are absorbed here and
    /// observable only as missing metrics.
    pub async fn collect(
        &self,
        valoper: &ValoperAddress,
        sink: &Arc<MetricSink>,
    ) -> Result<(), ChainError> {
        // Not spawned: the slash window value gates the miss-rate and ETA
        // derivations and must be captured before it can drift.
        tracing::debug!("Started querying current slash window progress");
        let query_start = Instant::now();

        let slash_window = match self.reader.slash_window().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "Could not get current slash window progress");
                return Err(e);
            }
        };

        tracing::debug!(
            request_time = query_start.elapsed().as_secs_f64(),
            "Finished querying current slash window progress"
        );

        sink.set_window_progress(slash_window.window_progress as f64);

        // Also not spawned: the params response feeds the window-size
        // computation and the vote-coverage accept list.
        tracing::debug!("Started querying oracle params");
        let query_start = Instant::now();

        let params = match self.reader.params().await {
            Ok(params) => params,
            Err(e) => {
                tracing::error!(error = %e, "Could not get oracle params");
                return Err(e);
            }
        };

        tracing::debug!(
            request_time = query_start.elapsed().as_secs_f64(),
            "Finished querying oracle params"
        );

        let window_size = derive::window_size(params.slash_window, params.vote_period);
        sink.set_window_size(window_size as f64);
        sink.set_slash_window(params.slash_window as f64);
        sink.set_min_valid_per_window(params.min_valid_per_window);
        sink.set_slash_fraction(params.slash_fraction);
        sink.set_vote_period(params.vote_period as f64);
        sink.set_symbols_count(params.accept_list.len() as f64);

        let handles = vec![
            self.spawn_miss_counter_task(
                valoper,
                sink,
                slash_window.window_progress,
                window_size,
                params.vote_period,
            ),
            self.spawn_feeder_task(valoper, sink),
            self.spawn_prevote_task(valoper, sink),
            self.spawn_vote_task(valoper, sink, params.accept_list.clone()),
        ];

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Snapshot task panicked");
            }
        }

        Ok(())
    }

    fn spawn_miss_counter_task(
        &self,
        valoper: &ValoperAddress,
        sink: &Arc<MetricSink>,
        window_progress: u64,
        window_size: u64,
        vote_period: u64,
    ) -> JoinHandle<()> {
        let reader = Arc::clone(&self.reader);
        let sink = Arc::clone(sink);
        let valoper = valoper.to_string();
        let block_time = self.block_time;

        tokio::spawn(async move {
            tracing::debug!(valoper = %valoper, "Started querying validator current miss counter");
            let query_start = Instant::now();

            let miss_counter = match reader.miss_counter(&valoper).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(
                        valoper = %valoper,
                        error = %e,
                        "Could not get validator current miss counter"
                    );
                    return;
                }
            };

            tracing::debug!(
                valoper = %valoper,
                request_time = query_start.elapsed().as_secs_f64(),
                "Finished querying validator current miss counter"
            );

            sink.set_miss_counter(&valoper, miss_counter as f64);

            match derive::miss_rate(miss_counter, window_progress) {
                Some(rate) => sink.set_miss_rate(&valoper, rate),
                None => tracing::warn!(
                    valoper = %valoper,
                    "Slash window progress is zero, miss rate is undefined and omitted"
                ),
            }

            let eta = derive::next_window_start_ms(
                window_size,
                window_progress,
                block_time,
                vote_period,
                unix_now_ms(),
            );
            sink.set_next_window_start(&valoper, eta as f64);
        })
    }

    fn spawn_feeder_task(&self, valoper: &ValoperAddress, sink: &Arc<MetricSink>) -> JoinHandle<()> {
        let reader = Arc::clone(&self.reader);
        let sink = Arc::clone(sink);
        let valoper = valoper.to_string();

        tokio::spawn(async move {
            tracing::debug!(
                valoper = %valoper,
                "Started querying feeder account associated with the validator"
            );
            let query_start = Instant::now();

            match reader.feeder_delegation(&valoper).await {
                Ok(feeder) => {
                    tracing::debug!(
                        valoper = %valoper,
                        request_time = query_start.elapsed().as_secs_f64(),
                        "Finished querying feeder account associated with the validator"
                    );
                    sink.set_feeder_account(&valoper, &feeder);
                }
                Err(e) => {
                    tracing::error!(
                        valoper = %valoper,
                        error = %e,
                        "Could not get feeder account associated with the validator"
                    );
                }
            }
        })
    }

    fn spawn_prevote_task(
        &self,
        valoper: &ValoperAddress,
        sink: &Arc<MetricSink>,
    ) -> JoinHandle<()> {
        let reader = Arc::clone(&self.reader);
        let sink = Arc::clone(sink);
        let valoper = valoper.to_string();

        tokio::spawn(async move {
            tracing::debug!(valoper = %valoper, "Started querying validator prevote aggregate");
            let query_start = Instant::now();

            match reader.aggregate_prevote(&valoper).await {
                Ok(prevote) => {
                    tracing::debug!(
                        valoper = %valoper,
                        request_time = query_start.elapsed().as_secs_f64(),
                        "Finished querying validator prevote aggregate"
                    );
                    sink.set_last_block_vote(&valoper, prevote.submit_block as f64);
                }
                // A validator may legitimately have no prevote yet.
                Err(e) if e.is_absence() => {
                    tracing::warn!(
                        valoper = %valoper,
                        error = %e,
                        "No aggregate prevote on record for the validator"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        valoper = %valoper,
                        error = %e,
                        "Could not get validator prevote aggregate"
                    );
                }
            }
        })
    }

    fn spawn_vote_task(
        &self,
        valoper: &ValoperAddress,
        sink: &Arc<MetricSink>,
        accept_list: Vec<AcceptedAsset>,
    ) -> JoinHandle<()> {
        let reader = Arc::clone(&self.reader);
        let sink = Arc::clone(sink);
        let valoper = valoper.to_string();

        tokio::spawn(async move {
            tracing::debug!(valoper = %valoper, "Started querying validator aggregate vote");
            let query_start = Instant::now();

            match reader.aggregate_vote(&valoper).await {
                Ok(vote) => {
                    tracing::debug!(
                        valoper = %valoper,
                        request_time = query_start.elapsed().as_secs_f64(),
                        "Finished querying validator aggregate vote"
                    );
                    for (symbol, value) in
                        derive::vote_misses(&accept_list, &vote.exchange_rate_tuples)
                    {
                        sink.set_aggregated_vote(symbol, value);
                    }
                }
                // No vote on record: every accepted asset counts as missed.
                Err(e) if e.is_absence() => {
                    tracing::warn!(
                        valoper = %valoper,
                        error = %e,
                        "No aggregate vote on record, marking every accepted asset as missed"
                    );
                    for (symbol, value) in derive::vote_misses(&accept_list, &[]) {
                        sink.set_aggregated_vote(symbol, value);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        valoper = %valoper,
                        error = %e,
                        "Could not get validator aggregate vote"
                    );
                }
            }
        })
    }
}

/// Milliseconds since the UNIX epoch
fn unix_now_ms() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as u64,
        Err(_) => {
            tracing::warn!("System clock is before the UNIX epoch");
            0
        }
    }
}

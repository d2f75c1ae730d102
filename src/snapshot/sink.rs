//! Per-request metric sink
//!
//! A `MetricSink` owns a fresh Prometheus registry plus every gauge family a
//! snapshot can produce. One sink is constructed per request, written during
//! collection, rendered exactly once and then dropped - there is no shared
//! registry, so nothing can leak between requests.
//!
//! Gauge handles are cheap to clone and internally thread-safe; the four
//! collection tasks write to disjoint families, so no further locking is
//! needed on top of registration.

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, HashMap};

/// Ephemeral, write-only collection of named gauges for one snapshot
pub struct MetricSink {
    registry: Registry,
    window_progress: Gauge,
    window_size: Gauge,
    slash_window: Gauge,
    min_valid_per_window: Gauge,
    slash_fraction: Gauge,
    vote_period: Gauge,
    symbols_count: Gauge,
    miss_counter: GaugeVec,
    miss_rate: GaugeVec,
    feeder_account: GaugeVec,
    next_window_start: GaugeVec,
    last_block_vote: GaugeVec,
    aggregated_votes: GaugeVec,
}

impl MetricSink {
    /// Create a sink with every gauge registered under `const_labels`
    pub fn new(const_labels: BTreeMap<String, String>) -> Result<Self, prometheus::Error> {
        let labels: HashMap<String, String> = const_labels.into_iter().collect();
        let registry = Registry::new();

        let gauge = |name: &str, help: &str| -> Result<Gauge, prometheus::Error> {
            let g = Gauge::with_opts(Opts::new(name, help).const_labels(labels.clone()))?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };
        let gauge_vec = |name: &str,
                         help: &str,
                         variable_labels: &[&str]|
         -> Result<GaugeVec, prometheus::Error> {
            let g = GaugeVec::new(
                Opts::new(name, help).const_labels(labels.clone()),
                variable_labels,
            )?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };

        let window_progress = gauge(
            "window_progress",
            "Current slash window progress, block number in the current window",
        )?;
        let window_size = gauge("window_size", "Current window size")?;
        let slash_window = gauge(
            "slash_window",
            "Number of blocks during which validators can miss votes",
        )?;
        let min_valid_per_window = gauge(
            "min_valid_per_window",
            "Percentage of misses triggering a slash at the end of the slash window",
        )?;
        let slash_fraction = gauge("slash_fraction", "Slash fraction")?;
        let vote_period = gauge("vote_period", "Number of blocks to submit the next vote")?;
        let symbols_count = gauge(
            "symbols_count",
            "Number of symbols the feeder is supposed to broadcast",
        )?;
        let miss_counter = gauge_vec(
            "miss_counter",
            "Current miss counter for a given validator",
            &["valoper"],
        )?;
        let miss_rate = gauge_vec(
            "miss_rate",
            "Current miss rate for a given validator",
            &["valoper"],
        )?;
        let feeder_account = gauge_vec(
            "feeder_account",
            "Account delegated for a given validator",
            &["valoper", "feeder"],
        )?;
        let next_window_start = gauge_vec(
            "next_window_start",
            "Timestamp of the next estimated window start in UTC milliseconds",
            &["valoper"],
        )?;
        let last_block_vote = gauge_vec(
            "last_block_vote",
            "Last block the validator voted",
            &["valoper"],
        )?;
        let aggregated_votes = gauge_vec(
            "aggregated_votes",
            "Whether the validator's current aggregate vote misses an asset",
            &["asset"],
        )?;

        Ok(Self {
            registry,
            window_progress,
            window_size,
            slash_window,
            min_valid_per_window,
            slash_fraction,
            vote_period,
            symbols_count,
            miss_counter,
            miss_rate,
            feeder_account,
            next_window_start,
            last_block_vote,
            aggregated_votes,
        })
    }

    pub fn set_window_progress(&self, value: f64) {
        self.window_progress.set(value);
    }

    pub fn set_window_size(&self, value: f64) {
        self.window_size.set(value);
    }

    pub fn set_slash_window(&self, value: f64) {
        self.slash_window.set(value);
    }

    pub fn set_min_valid_per_window(&self, value: f64) {
        self.min_valid_per_window.set(value);
    }

    pub fn set_slash_fraction(&self, value: f64) {
        self.slash_fraction.set(value);
    }

    pub fn set_vote_period(&self, value: f64) {
        self.vote_period.set(value);
    }

    pub fn set_symbols_count(&self, value: f64) {
        self.symbols_count.set(value);
    }

    pub fn set_miss_counter(&self, valoper: &str, value: f64) {
        self.miss_counter.with_label_values(&[valoper]).set(value);
    }

    pub fn set_miss_rate(&self, valoper: &str, value: f64) {
        self.miss_rate.with_label_values(&[valoper]).set(value);
    }

    /// Record the feeder delegation existence gauge (always 1 when present).
    ///
    /// Absence of this metric - not a 0 value - is how "no delegation" is
    /// represented in the exposition.
    pub fn set_feeder_account(&self, valoper: &str, feeder: &str) {
        self.feeder_account
            .with_label_values(&[valoper, feeder])
            .set(1.0);
    }

    pub fn set_next_window_start(&self, valoper: &str, value: f64) {
        self.next_window_start
            .with_label_values(&[valoper])
            .set(value);
    }

    pub fn set_last_block_vote(&self, valoper: &str, value: f64) {
        self.last_block_vote
            .with_label_values(&[valoper])
            .set(value);
    }

    pub fn set_aggregated_vote(&self, asset: &str, value: f64) {
        self.aggregated_votes.with_label_values(&[asset]).set(value);
    }

    /// Render the sink in Prometheus text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("exposition is not valid UTF-8: {e}")))
    }
}

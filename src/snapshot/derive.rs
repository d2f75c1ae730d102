//! Derivation engine
//!
//! Pure, deterministic functions over already-fetched chain state. All
//! arithmetic on chain-supplied integers is guarded: division by zero and
//! negative block spans yield a defined result instead of a fault.

use crate::chain::{AcceptedAsset, ExchangeRateTuple};

/// Number of vote periods in a slash window
///
/// Integer division, truncating: `slash_window=100, vote_period=30` gives 3.
/// A zero vote period (never expected from a live chain) yields 0.
pub fn window_size(slash_window: u64, vote_period: u64) -> u64 {
    slash_window.checked_div(vote_period).unwrap_or(0)
}

/// Ratio of missed votes to blocks elapsed in the current window
///
/// Returns `None` when `window_progress` is 0: the ratio is undefined at the
/// window boundary and the metric is omitted rather than given a sentinel.
pub fn miss_rate(miss_counter: u64, window_progress: u64) -> Option<f64> {
    if window_progress == 0 {
        return None;
    }
    Some(miss_counter as f64 / window_progress as f64)
}

/// Estimated UTC timestamp of the next window start, in milliseconds
///
/// `(window_size - window_progress + 1)` blocks remain until the window
/// rolls over; clock or parameter skew can push that span negative, in which
/// case it is clamped to zero so the estimate never precedes `now_ms`.
pub fn next_window_start_ms(
    window_size: u64,
    window_progress: u64,
    block_time: u64,
    vote_period: u64,
    now_ms: u64,
) -> u64 {
    let blocks_remaining = window_size.saturating_add(1).saturating_sub(window_progress);
    let seconds_remaining = blocks_remaining
        .saturating_mul(block_time)
        .saturating_mul(vote_period);
    now_ms.saturating_add(seconds_remaining.saturating_mul(1000))
}

/// Per-asset vote coverage, missed-by-default
///
/// For every accept-list symbol the value is `0.0` when the symbol appears
/// (case-insensitively) among the submitted exchange-rate tuples, else
/// `1.0`. A validator that never voted passes an empty tuple slice and gets
/// every asset marked missed.
pub fn vote_misses<'a>(
    accept_list: &'a [AcceptedAsset],
    tuples: &[ExchangeRateTuple],
) -> Vec<(&'a str, f64)> {
    accept_list
        .iter()
        .map(|asset| {
            let voted = tuples
                .iter()
                .any(|tuple| tuple.denom.eq_ignore_ascii_case(&asset.symbol_denom));
            (asset.symbol_denom.as_str(), if voted { 0.0 } else { 1.0 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn asset(symbol: &str) -> AcceptedAsset {
        AcceptedAsset {
            base_denom: format!("u{}", symbol.to_lowercase()),
            symbol_denom: symbol.to_string(),
        }
    }

    fn tuple(denom: &str) -> ExchangeRateTuple {
        ExchangeRateTuple {
            denom: denom.to_string(),
            exchange_rate: "1.000000000000000000".to_string(),
        }
    }

    #[test]
    fn window_size_truncates() {
        assert_eq!(window_size(100, 30), 3);
        assert_eq!(window_size(100800, 5), 20160);
        assert_eq!(window_size(29, 30), 0);
    }

    #[test]
    fn window_size_guards_zero_vote_period() {
        assert_eq!(window_size(100800, 0), 0);
    }

    #[test]
    fn miss_rate_is_plain_ratio() {
        assert_eq!(miss_rate(25, 100), Some(0.25));
        assert_eq!(miss_rate(0, 100), Some(0.0));
        assert_eq!(miss_rate(100, 100), Some(1.0));
    }

    #[test]
    fn miss_rate_is_undefined_at_zero_progress() {
        assert_eq!(miss_rate(0, 0), None);
        assert_eq!(miss_rate(42, 0), None);
    }

    #[test]
    fn next_window_eta_example() {
        // windowSize=3, windowProgress=1, blockTime=6, votePeriod=30
        // blocksRemaining = 3 - 1 + 1 = 3, seconds = 3 * 6 * 30 = 540
        let eta = next_window_start_ms(3, 1, 6, 30, 1_000_000);
        assert_eq!(eta, 1_000_000 + 540 * 1000);
    }

    #[test]
    fn next_window_eta_clamps_negative_span_to_now() {
        // Progress past the window size (parameter skew): remaining is zero
        let eta = next_window_start_ms(3, 50, 6, 30, 1_000_000);
        assert_eq!(eta, 1_000_000);
    }

    #[test]
    fn next_window_eta_does_not_overflow() {
        let eta = next_window_start_ms(u64::MAX, 0, u64::MAX, u64::MAX, u64::MAX);
        assert_eq!(eta, u64::MAX);
    }

    #[test]
    fn vote_misses_matches_case_insensitively() {
        let accept_list = vec![asset("ATOM"), asset("UMEE")];
        let tuples = vec![tuple("atom")];

        let misses = vote_misses(&accept_list, &tuples);
        assert_eq!(misses, vec![("ATOM", 0.0), ("UMEE", 1.0)]);
    }

    #[test]
    fn vote_misses_marks_everything_missed_without_a_vote() {
        let accept_list = vec![asset("ATOM"), asset("UMEE"), asset("JUNO")];

        let misses = vote_misses(&accept_list, &[]);
        assert!(misses.iter().all(|(_, v)| *v == 1.0));
        assert_eq!(misses.len(), 3);
    }

    #[test]
    fn vote_misses_preserves_accept_list_order() {
        let accept_list = vec![asset("UMEE"), asset("ATOM")];
        let misses = vote_misses(&accept_list, &[tuple("UMEE")]);
        assert_eq!(misses[0].0, "UMEE");
        assert_eq!(misses[1].0, "ATOM");
    }

    #[test]
    fn empty_accept_list_yields_no_entries() {
        assert!(vote_misses(&[], &[tuple("atom")]).is_empty());
    }

    proptest! {
        #[test]
        fn miss_rate_exact_for_positive_progress(
            miss in 0u64..1_000_000,
            progress in 1u64..1_000_000,
        ) {
            let rate = miss_rate(miss, progress).unwrap();
            prop_assert!((rate - miss as f64 / progress as f64).abs() < f64::EPSILON);
            prop_assert!(rate >= 0.0);
        }

        #[test]
        fn next_window_eta_never_precedes_now(
            size in 0u64..10_000_000,
            progress in 0u64..10_000_000,
            block_time in 1u64..3600,
            vote_period in 1u64..100_000,
            now_ms in 0u64..4_102_444_800_000,
        ) {
            let eta = next_window_start_ms(size, progress, block_time, vote_period, now_ms);
            prop_assert!(eta >= now_ms);
        }
    }
}

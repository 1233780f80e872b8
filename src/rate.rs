#![allow(clippy::cast_precision_loss)]

use crate::filter::InterfaceFilter;
use crate::types::{AggregateCounters, Rates, Snapshot};

/// Aggregate totals observed on the previous cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateState {
    pub previous_rx: u64,
    pub previous_tx: u64,
}

impl From<AggregateCounters> for RateState {
    fn from(totals: AggregateCounters) -> Self {
        Self {
            previous_rx: totals.total_rx,
            previous_tx: totals.total_tx,
        }
    }
}

/// Turns successive snapshots into instantaneous throughput.
///
/// Each rate is the single-interval derivative against the immediately
/// preceding cycle; there is no smoothing. The first update after creation
/// or [`reset`](Self::reset) only records a baseline and reports zero.
#[derive(Debug, Clone, Default)]
pub struct RateCalculator {
    state: Option<RateState>,
}

impl RateCalculator {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// Aggregate `snapshot` through `filter` and derive rates over
    /// `interval_secs`, which must be positive.
    pub fn update(
        &mut self,
        snapshot: &Snapshot,
        filter: &InterfaceFilter,
        interval_secs: f64,
    ) -> Rates {
        self.update_totals(snapshot.aggregate(filter), interval_secs)
    }

    /// Derive rates from already aggregated totals.
    ///
    /// A total lower than the previous one yields a negative rate.
    pub fn update_totals(&mut self, totals: AggregateCounters, interval_secs: f64) -> Rates {
        let rates = match self.state {
            None => Rates::ZERO,
            Some(previous) => Rates {
                rx: delta(previous.previous_rx, totals.total_rx) / interval_secs,
                tx: delta(previous.previous_tx, totals.total_tx) / interval_secs,
            },
        };

        self.state = Some(RateState::from(totals));
        rates
    }

    /// Forget the baseline so the next update starts over
    pub fn reset(&mut self) {
        self.state = None;
    }

    #[must_use]
    pub const fn state(&self) -> Option<RateState> {
        self.state
    }
}

/// Signed difference, taken in integers so large totals keep small deltas exact
fn delta(previous: u64, current: u64) -> f64 {
    (i128::from(current) - i128::from(previous)) as f64
}

use std::sync::Arc;

use log::debug;

use crate::config::Config;
use crate::counter::CounterSource;
use crate::filter::InterfaceFilter;
use crate::format::format_display;
use crate::rate::RateCalculator;
use crate::types::Rates;
use crate::Result;

/// One read → aggregate → rate pipeline with its own rate state
pub struct Sampler {
    source: Arc<dyn CounterSource>,
    filter: InterfaceFilter,
    calculator: RateCalculator,
    interval_secs: f64,
}

impl Sampler {
    /// Create a sampler that divides counter deltas by `interval_secs`
    pub fn new(source: Arc<dyn CounterSource>, filter: InterfaceFilter, interval_secs: f64) -> Self {
        Self {
            source,
            filter,
            calculator: RateCalculator::new(),
            interval_secs,
        }
    }

    pub fn from_config(config: &Config, source: Arc<dyn CounterSource>) -> Self {
        Self::new(source, config.filter(), config.interval_secs_f64())
    }

    /// Run one cycle and return the rates.
    ///
    /// # Errors
    /// Returns [`crate::Error::SourceUnavailable`] if the counters could not
    /// be read. The rate state is left untouched in that case.
    pub fn tick(&mut self) -> Result<Rates> {
        let snapshot = self.source.read()?;
        let totals = snapshot.aggregate(&self.filter);
        debug!("Sampled {} interfaces, {totals}", snapshot.len());

        Ok(self.calculator.update_totals(totals, self.interval_secs))
    }

    /// Run one cycle and render it as `"↓ <down> ↑ <up>"`.
    ///
    /// # Errors
    /// See [`Sampler::tick`].
    pub fn tick_display(&mut self) -> Result<String> {
        self.tick().map(|rates| format_display(&rates))
    }

    /// Drop the baseline; the next tick reports zero again
    pub fn reset(&mut self) {
        self.calculator.reset();
    }

    #[must_use]
    pub const fn calculator(&self) -> &RateCalculator {
        &self.calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::MockCounterSource;
    use crate::types::{InterfaceSample, Snapshot};
    use crate::Error;
    use mockall::Sequence;

    fn snapshot(eth_rx: u64, eth_tx: u64) -> Snapshot {
        Snapshot::from(vec![
            InterfaceSample::new("eth0", eth_rx, eth_tx),
            InterfaceSample::new("lo", 1 << 40, 1 << 40),
        ])
    }

    fn sampler(mock: MockCounterSource) -> Sampler {
        Sampler::new(Arc::new(mock), InterfaceFilter::default(), 3.0)
    }

    #[test]
    fn test_first_tick_is_baseline() {
        let mut mock = MockCounterSource::new();
        mock.expect_read()
            .times(1)
            .returning(|| Ok(snapshot(5_000_000, 7_000_000)));

        let mut sampler = sampler(mock);
        assert_eq!(sampler.tick_display().unwrap(), "↓ 0.0 B/s ↑ 0.0 B/s");
    }

    #[test]
    fn test_successive_ticks() {
        let mut mock = MockCounterSource::new();
        let mut seq = Sequence::new();
        mock.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(snapshot(1000, 500)));
        mock.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(snapshot(4072, 500)));

        let mut sampler = sampler(mock);
        assert_eq!(sampler.tick().unwrap(), Rates::ZERO);
        assert_eq!(sampler.tick().unwrap(), Rates::new(1024.0, 0.0));
    }

    #[test]
    fn test_failed_read_keeps_previous_state() {
        let mut mock = MockCounterSource::new();
        let mut seq = Sequence::new();
        mock.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(snapshot(1000, 1000)));
        mock.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(Error::source_unavailable("/proc/net/dev", "permission denied")));
        mock.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(snapshot(4000, 1000)));

        let mut sampler = sampler(mock);
        sampler.tick().unwrap();

        let err = sampler.tick().unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert_eq!(
            sampler.calculator().state().map(|s| s.previous_rx),
            Some(1000)
        );

        assert_eq!(sampler.tick().unwrap(), Rates::new(1000.0, 0.0));
    }

    #[test]
    fn test_reset_rebaselines() {
        let mut mock = MockCounterSource::new();
        mock.expect_read().times(2).returning(|| Ok(snapshot(1, 1)));

        let mut sampler = sampler(mock);
        sampler.tick().unwrap();
        sampler.reset();
        assert!(sampler.calculator().state().is_none());
        sampler.tick().unwrap();
        assert!(sampler.calculator().state().is_some());
    }
}

use std::sync::Arc;

use log::info;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::Publisher;
use crate::config::Config;
use crate::counter::{CounterSource, ProcNetDev};
use crate::sampler::Sampler;
use crate::{Error, Result};

/// [`super::SpeedMonitor`] for hosts that already run a tokio event loop.
///
/// Cycles run on a spawned task; stopping aborts the task at its next
/// suspension point, which only ever lies between two cycles.
pub struct AsyncSpeedMonitor {
    config: Config,
    source: Arc<dyn CounterSource>,
    publisher: Publisher,
    task: Option<JoinHandle<()>>,
}

impl AsyncSpeedMonitor {
    pub fn new(config: Config, source: impl CounterSource + 'static) -> Self {
        Self {
            config,
            source: Arc::new(source),
            publisher: Publisher::new(),
            task: None,
        }
    }

    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let source = ProcNetDev::with_path(config.source_path.clone());
        Self::new(config, source)
    }

    /// Register a callback for display updates
    ///
    /// # Errors
    /// Returns an error if the callback cannot be registered
    pub fn on_update<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(&str) + Send + 'static,
    {
        self.publisher.register(Box::new(callback));
        Ok(())
    }

    /// Run one cycle immediately and schedule the rest on the current tokio
    /// runtime. Does nothing if already running.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Runtime`] when called outside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Ok(());
        }

        self.config.validate()?;
        let runtime = Handle::try_current().map_err(|e| Error::runtime(e.to_string()))?;

        let mut sampler = Sampler::from_config(&self.config, Arc::clone(&self.source));
        let publisher = self.publisher.clone();
        publisher.run_tick(&mut sampler);

        let period = self.config.interval();
        self.task = Some(runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                publisher.run_tick(&mut sampler);
            }
        }));

        info!(
            "Started async throughput monitor, refreshing every {}s",
            self.config.refresh_interval_secs
        );
        Ok(())
    }

    /// Cancel the schedule; idempotent
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Stopped async throughput monitor");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.task.is_some()
    }

    #[must_use]
    pub fn display(&self) -> String {
        self.publisher.display()
    }
}

impl Drop for AsyncSpeedMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::MockCounterSource;
    use crate::format::INITIAL_DISPLAY;
    use crate::types::{InterfaceSample, Snapshot};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn counting_source() -> MockCounterSource {
        let reads = AtomicU64::new(0);
        let mut mock = MockCounterSource::new();
        mock.expect_read().returning(move || {
            let n = reads.fetch_add(1, Ordering::SeqCst);
            Ok(Snapshot::from(vec![InterfaceSample::new("wlan0", 0, n * 1536)]))
        });
        mock
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let mut monitor = AsyncSpeedMonitor::new(Config::default(), counting_source());
        assert!(matches!(monitor.start(), Err(Error::Runtime { .. })));
        assert!(!monitor.is_running());
        assert_eq!(monitor.display(), INITIAL_DISPLAY);
    }

    #[test]
    fn test_start_inside_runtime() {
        tokio_test::block_on(async {
            let mut monitor = AsyncSpeedMonitor::new(Config::default(), counting_source());
            monitor.start().unwrap();
            assert!(monitor.is_running());
            assert_eq!(monitor.display(), "↓ 0.0 B/s ↑ 0.0 B/s");
            monitor.stop();
            monitor.stop();
            assert!(!monitor.is_running());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_updates() {
        let mut monitor =
            AsyncSpeedMonitor::new(Config::default().with_interval(2), counting_source());
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = Arc::clone(&updates);
        monitor
            .on_update(move |text| updates_clone.lock().unwrap().push(text.to_string()))
            .unwrap();

        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(4500)).await;
        monitor.stop();

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[1], "↓ 0.0 B/s ↑ 768.0 B/s");
        assert_eq!(updates[2], "↓ 0.0 B/s ↑ 768.0 B/s");
    }
}

//! Scheduling the sampling cycle and publishing the display string.

#[cfg(feature = "async")]
mod async_monitor;

#[cfg(feature = "async")]
pub use async_monitor::AsyncSpeedMonitor;

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::config::Config;
use crate::counter::{CounterSource, ProcNetDev};
use crate::format::INITIAL_DISPLAY;
use crate::sampler::Sampler;
use crate::{Error, Result};

/// Callback invoked with the new display string after every successful cycle
pub type UpdateCallback = Box<dyn Fn(&str) + Send + 'static>;

/// Shared sink for display updates: the last published string plus the
/// registered callbacks.
#[derive(Clone)]
pub(crate) struct Publisher {
    display: Arc<Mutex<String>>,
    callbacks: Arc<Mutex<Vec<UpdateCallback>>>,
}

impl Publisher {
    pub(crate) fn new() -> Self {
        Self {
            display: Arc::new(Mutex::new(INITIAL_DISPLAY.to_string())),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn register(&self, callback: UpdateCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    #[cfg(test)]
    pub(crate) fn callback_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn display(&self) -> String {
        self.display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one cycle. A failed cycle is logged and leaves the published
    /// string as it was.
    ///
    /// Panics raised by the counter source or by a callback are caught and
    /// logged so the schedule keeps running.
    pub(crate) fn run_tick(&self, sampler: &mut Sampler) {
        match panic::catch_unwind(AssertUnwindSafe(|| sampler.tick_display())) {
            Ok(Ok(text)) => self.publish(text),
            Ok(Err(err)) => warn!("Skipping display update: {err}"),
            Err(_) => warn!("Skipping display update: sampling cycle panicked"),
        }
    }

    fn publish(&self, text: String) {
        {
            let callbacks = self
                .callbacks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for callback in callbacks.iter() {
                if panic::catch_unwind(AssertUnwindSafe(|| callback(&text))).is_err() {
                    warn!("Display update callback panicked");
                }
            }
        }
        let mut display = self.display.lock().unwrap_or_else(PoisonError::into_inner);
        *display = text;
    }
}

struct Worker {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically samples throughput on a background thread.
///
/// Each [`start`](Self::start) begins with a fresh baseline, so the first
/// published string after starting always reads zero in both directions.
pub struct SpeedMonitor {
    config: Config,
    source: Arc<dyn CounterSource>,
    publisher: Publisher,
    worker: Option<Worker>,
}

impl SpeedMonitor {
    /// Create a monitor reading counters from `source`
    pub fn new(config: Config, source: impl CounterSource + 'static) -> Self {
        Self {
            config,
            source: Arc::new(source),
            publisher: Publisher::new(),
            worker: None,
        }
    }

    /// Create a monitor reading the table at `config.source_path`
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

    /// Run one cycle immediately, then keep running one every refresh
    /// interval until [`stop`](Self::stop). Does nothing if already running.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is invalid, or
    /// [`Error::Runtime`] if the worker thread cannot be spawned.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.config.validate()?;

        let mut sampler = Sampler::from_config(&self.config, Arc::clone(&self.source));
        let publisher = self.publisher.clone();
        publisher.run_tick(&mut sampler);

        let (shutdown, rx) = channel::<()>();
        let interval = self.config.interval();

        let handle = thread::Builder::new()
            .name("netspeed-monitor".to_string())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => publisher.run_tick(&mut sampler),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Monitor worker exiting");
            })
            .map_err(|e| Error::runtime(format!("failed to spawn monitor thread: {e}")))?;

        self.worker = Some(Worker { shutdown, handle });
        info!(
            "Started throughput monitor, refreshing every {}s",
            self.config.refresh_interval_secs
        );
        Ok(())
    }

    /// Stop the periodic cycle. A cycle already in progress finishes first;
    /// none start afterwards. Safe to call repeatedly or before `start`.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(());
            if worker.handle.join().is_err() {
                warn!("Monitor worker panicked");
            }
            info!("Stopped throughput monitor");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The most recently published display string
    #[must_use]
    pub fn display(&self) -> String {
        self.publisher.display()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for SpeedMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::MockCounterSource;
    use crate::types::{InterfaceSample, Snapshot};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_source() -> MockCounterSource {
        let reads = AtomicU64::new(0);
        let mut mock = MockCounterSource::new();
        mock.expect_read().returning(move || {
            let n = reads.fetch_add(1, Ordering::SeqCst);
            Ok(Snapshot::from(vec![InterfaceSample::new("eth0", n * 3072, 0)]))
        });
        mock
    }

    #[test]
    fn test_monitor_creation() {
        let monitor = SpeedMonitor::new(Config::default(), counting_source());
        assert!(!monitor.is_running());
        assert_eq!(monitor.display(), INITIAL_DISPLAY);
        assert_eq!(monitor.config().interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_callback_registration() {
        let mut monitor = SpeedMonitor::new(Config::default(), counting_source());
        monitor.on_update(|_text| {}).unwrap();
        monitor.on_update(|_text| {}).unwrap();
        assert_eq!(monitor.publisher.callback_count(), 2);
    }

    #[test]
    fn test_start_runs_one_cycle_immediately() {
        let mut monitor = SpeedMonitor::new(Config::default(), counting_source());
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = Arc::clone(&updates);
        monitor
            .on_update(move |text| updates_clone.lock().unwrap().push(text.to_string()))
            .unwrap();

        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.display(), "↓ 0.0 B/s ↑ 0.0 B/s");
        assert_eq!(*updates.lock().unwrap(), ["↓ 0.0 B/s ↑ 0.0 B/s"]);

        monitor.stop();
    }

    #[test]
    fn test_periodic_updates() {
        let config = Config::default().with_interval(1);
        let mut monitor = SpeedMonitor::new(config, counting_source());
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = Arc::clone(&updates);
        monitor
            .on_update(move |text| updates_clone.lock().unwrap().push(text.to_string()))
            .unwrap();

        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(1500));
        monitor.stop();

        let updates = updates.lock().unwrap();
        assert!(updates.len() >= 2, "expected a scheduled update, got {updates:?}");
        assert_eq!(updates[1], "↓ 3.0 KB/s ↑ 0.0 B/s");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut monitor = SpeedMonitor::new(Config::default(), counting_source());
        monitor.stop();
        assert!(!monitor.is_running());

        monitor.start().unwrap();
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_no_cycles_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let mut monitor =
            SpeedMonitor::new(Config::default().with_interval(1), counting_source());
        monitor
            .on_update(move |_text| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        monitor.start().unwrap();
        monitor.stop();
        let after_stop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(1500));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_failed_cycle_keeps_stale_display() {
        let mut mock = MockCounterSource::new();
        mock.expect_read()
            .returning(|| Err(Error::source_unavailable("/proc/net/dev", "not found")));

        let mut monitor = SpeedMonitor::new(Config::default(), mock);
        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.display(), INITIAL_DISPLAY);
        monitor.stop();
    }

    #[test]
    fn test_panicking_callback_does_not_stop_schedule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let mut monitor = SpeedMonitor::new(Config::default().with_interval(1), counting_source());
        monitor
            .on_update(move |_text| {
                if calls_clone.fetch_add(1, Ordering::SeqCst) == 1 {
                    panic!("host widget went away");
                }
            })
            .unwrap();

        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(3500));
        assert!(monitor.is_running());
        monitor.stop();

        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(monitor.display(), "↓ 3.0 KB/s ↑ 0.0 B/s");
    }

    #[test]
    fn test_panicking_source_keeps_stale_display() {
        struct PanicsOnSecondRead(AtomicU64);

        impl CounterSource for PanicsOnSecondRead {
            fn read(&self) -> Result<Snapshot> {
                match self.0.fetch_add(1, Ordering::SeqCst) {
                    1 => panic!("counter table vanished mid-read"),
                    n => Ok(Snapshot::from(vec![InterfaceSample::new("eth0", n * 1024, 0)])),
                }
            }
        }

        let source = PanicsOnSecondRead(AtomicU64::new(0));
        let mut monitor = SpeedMonitor::new(Config::default().with_interval(1), source);
        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(2500));
        assert!(monitor.is_running());
        monitor.stop();

        // Reads 0 and 2 succeeded; the panicked read left the baseline at 0.
        assert_eq!(monitor.display(), "↓ 2.0 KB/s ↑ 0.0 B/s");
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let mut monitor = SpeedMonitor::new(Config::default().with_interval(0), counting_source());
        assert!(matches!(monitor.start(), Err(Error::Config { .. })));
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_restart_uses_fresh_baseline() {
        let mut monitor = SpeedMonitor::new(Config::default(), counting_source());
        monitor.start().unwrap();
        monitor.stop();
        monitor.start().unwrap();
        assert_eq!(monitor.display(), "↓ 0.0 B/s ↑ 0.0 B/s");
        monitor.stop();
    }
}

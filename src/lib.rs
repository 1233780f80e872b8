#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Netspeed
//!
//! Aggregate network throughput for status bars and panel indicators.
//!
//! The crate samples the cumulative per-interface byte counters the kernel
//! exposes, sums them over the "real" interfaces, derives upload and
//! download rates from one cycle to the next, and renders them as a short
//! string such as `↓ 1.5 MB/s ↑ 12.0 KB/s`:
//! - Counter table parsing that tolerates irregular whitespace and bad rows
//! - Prefix-based filtering of loopback, virtual and container interfaces
//! - Single-interval rate derivation with a zero first sample
//! - Binary unit scaling from `B/s` up to `GB/s`
//! - A scheduled monitor with `start`/`stop`/`on_update` for host integration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netspeed::{Config, SpeedMonitor};
//!
//! let mut monitor = SpeedMonitor::from_config(Config::default());
//! monitor.on_update(|text| println!("{text}"))?;
//! monitor.start()?;
//! // ... later, when the host tears the indicator down:
//! monitor.stop();
//! # Ok::<(), netspeed::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async` - Enable [`AsyncSpeedMonitor`] on a tokio runtime
//! - `serde-support` - Enable serialization of the data types and TOML configuration files
//! - `linux-procfs` - Enable [`counter::ProcfsSource`] backed by the `procfs` crate

mod config;
mod error;
mod filter;
mod format;
mod rate;
mod sampler;
mod types;

pub mod counter;
pub mod monitor;

// Re-export core types
pub use config::{Config, DEFAULT_REFRESH_INTERVAL_SECS};
pub use error::{Error, Result};
pub use types::{AggregateCounters, InterfaceSample, Rates, Snapshot};

// Pipeline stages
pub use counter::{parse_line, parse_table, CommandSource, CounterSource, ProcNetDev, StaticSource};
pub use filter::{InterfaceFilter, DEFAULT_IGNORED_PREFIXES};
pub use format::{format_display, format_speed, SpeedUnit, SpeedValue, INITIAL_DISPLAY};
pub use rate::{RateCalculator, RateState};
pub use sampler::Sampler;

// Host integration
pub use monitor::{SpeedMonitor, UpdateCallback};

// Optional async monitoring (behind feature flag)
#[cfg(feature = "async")]
pub use monitor::AsyncSpeedMonitor;

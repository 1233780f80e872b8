#![allow(clippy::cast_precision_loss)]

use bytesize::ByteSize;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::filter::InterfaceFilter;

/// Cumulative byte counters of one interface at one instant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct InterfaceSample {
    /// Interface name as reported by the kernel (e.g. `eth0`)
    pub name: String,
    /// Bytes received since the interface came up
    pub rx_bytes: u64,
    /// Bytes transmitted since the interface came up
    pub tx_bytes: u64,
}

impl InterfaceSample {
    /// Create a new interface sample
    #[must_use]
    pub fn new(name: impl Into<String>, rx_bytes: u64, tx_bytes: u64) -> Self {
        Self {
            name: name.into(),
            rx_bytes,
            tx_bytes,
        }
    }
}

/// All interfaces reported by the counter source in one read.
///
/// Samples keep the order the source produced them in; nothing downstream
/// depends on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Snapshot {
    samples: Vec<InterfaceSample>,
}

impl Snapshot {
    /// Create an empty snapshot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Append a sample
    pub fn push(&mut self, sample: InterfaceSample) {
        self.samples.push(sample);
    }

    /// Number of interfaces in the snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the source reported no interfaces
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over the samples in source order
    pub fn iter(&self) -> std::slice::Iter<'_, InterfaceSample> {
        self.samples.iter()
    }

    /// Look up a sample by interface name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InterfaceSample> {
        self.samples.iter().find(|sample| sample.name == name)
    }

    /// Sum the counters of every interface the filter includes
    #[must_use]
    pub fn aggregate(&self, filter: &InterfaceFilter) -> AggregateCounters {
        self.samples
            .iter()
            .filter(|sample| filter.should_include(&sample.name))
            .fold(AggregateCounters::default(), |totals, sample| {
                AggregateCounters {
                    total_rx: totals.total_rx.saturating_add(sample.rx_bytes),
                    total_tx: totals.total_tx.saturating_add(sample.tx_bytes),
                }
            })
    }
}

impl From<Vec<InterfaceSample>> for Snapshot {
    fn from(samples: Vec<InterfaceSample>) -> Self {
        Self { samples }
    }
}

impl FromIterator<InterfaceSample> for Snapshot {
    fn from_iter<I: IntoIterator<Item = InterfaceSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = InterfaceSample;
    type IntoIter = std::vec::IntoIter<InterfaceSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a InterfaceSample;
    type IntoIter = std::slice::Iter<'a, InterfaceSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Byte totals over the included interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AggregateCounters {
    pub total_rx: u64,
    pub total_tx: u64,
}

impl AggregateCounters {
    #[must_use]
    pub const fn new(total_rx: u64, total_tx: u64) -> Self {
        Self { total_rx, total_tx }
    }
}

impl std::fmt::Display for AggregateCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RX: {} ({} bytes), TX: {} ({} bytes)",
            ByteSize(self.total_rx),
            self.total_rx,
            ByteSize(self.total_tx),
            self.total_tx
        )
    }
}

/// Instantaneous throughput in bytes per second.
///
/// Either direction is negative when the aggregate counter went backwards
/// between two cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Rates {
    /// Download rate
    pub rx: f64,
    /// Upload rate
    pub tx: f64,
}

impl Rates {
    pub const ZERO: Self = Self { rx: 0.0, tx: 0.0 };

    #[must_use]
    pub const fn new(rx: f64, tx: f64) -> Self {
        Self { rx, tx }
    }
}

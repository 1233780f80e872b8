//! Reading cumulative per-interface byte counters.
//!
//! The kernel exposes the counters as a text table (`/proc/net/dev` on
//! Linux):
//!
//! ```text
//! Inter-|   Receive                                                |  Transmit
//!  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
//!   eth0: 1000      10    0    0    0     0          0         0      500       5    0    0    0     0       0          0
//! ```
//!
//! Each interface line carries 16 numeric fields, 8 receive-side followed by
//! 8 transmit-side. Only received bytes (field 1) and transmitted bytes
//! (field 9) are consumed.

mod sources;

#[cfg(all(feature = "linux-procfs", target_os = "linux"))]
mod procfs_source;

pub use sources::{CommandSource, ProcNetDev, StaticSource, DEFAULT_SOURCE_PATH};

#[cfg(all(feature = "linux-procfs", target_os = "linux"))]
pub use procfs_source::ProcfsSource;

use log::debug;

use crate::types::{InterfaceSample, Snapshot};
use crate::{Error, Result};

/// Number of header lines preceding the interface rows
pub const HEADER_LINES: usize = 2;

/// Zero-based position of the received-bytes field after the colon
pub const RX_BYTES_FIELD: usize = 0;

/// Zero-based position of the transmitted-bytes field after the colon
pub const TX_BYTES_FIELD: usize = 8;

/// A provider of counter snapshots, reloaded fresh on every call.
#[cfg_attr(test, mockall::automock)]
pub trait CounterSource: Send + Sync {
    /// Read the current counters of every interface.
    ///
    /// # Errors
    /// Returns [`Error::SourceUnavailable`] if the underlying source cannot
    /// be obtained. Individual malformed lines never fail the read.
    fn read(&self) -> Result<Snapshot>;
}

/// Parse one interface row of the counter table.
///
/// Whitespace around the name and between fields is irregular in practice
/// (wide counters run straight into the colon), so any amount is accepted.
///
/// # Errors
/// Returns [`Error::MalformedLine`] if the colon is missing, there are no
/// fields after it, or the byte fields are absent or not numeric.
pub fn parse_line(line: &str) -> Result<InterfaceSample> {
    let trimmed = line.trim();
    let (name, data) = trimmed
        .split_once(':')
        .ok_or_else(|| Error::malformed_line(trimmed, "missing ':' separator"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::malformed_line(trimmed, "empty interface name"));
    }

    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.is_empty() {
        return Err(Error::malformed_line(trimmed, "no counter fields"));
    }

    let counter = |index: usize, label: &str| -> Result<u64> {
        let raw = fields.get(index).ok_or_else(|| {
            Error::malformed_line(
                trimmed,
                format!("{label} field missing ({} fields present)", fields.len()),
            )
        })?;
        raw.parse::<u64>()
            .map_err(|e| Error::malformed_line(trimmed, format!("{label} field '{raw}': {e}")))
    };

    Ok(InterfaceSample {
        name: name.to_string(),
        rx_bytes: counter(RX_BYTES_FIELD, "rx bytes")?,
        tx_bytes: counter(TX_BYTES_FIELD, "tx bytes")?,
    })
}

/// Parse a whole counter table into a snapshot.
///
/// The first [`HEADER_LINES`] lines are skipped whatever they contain. Blank
/// lines are ignored and malformed rows are logged and dropped.
#[must_use]
pub fn parse_table(text: &str) -> Snapshot {
    text.lines()
        .skip(HEADER_LINES)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_line(line) {
            Ok(sample) => Some(sample),
            Err(err) => {
                debug!("Skipping counter row: {err}");
                None
            }
        })
        .collect()
}

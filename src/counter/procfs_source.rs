use super::CounterSource;
use crate::types::{InterfaceSample, Snapshot};
use crate::{Error, Result};

/// Reads counters through the `procfs` crate's `/proc/net/dev` parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcfsSource;

impl ProcfsSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CounterSource for ProcfsSource {
    fn read(&self) -> Result<Snapshot> {
        let devices = ::procfs::net::dev_status()
            .map_err(|e| Error::source_unavailable(super::DEFAULT_SOURCE_PATH, e.to_string()))?;

        Ok(devices
            .into_values()
            .map(|device| InterfaceSample::new(device.name, device.recv_bytes, device.sent_bytes))
            .collect())
    }
}

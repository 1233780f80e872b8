use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{parse_table, CounterSource};
use crate::types::Snapshot;
use crate::{Error, Result};

/// Where the Linux kernel exposes per-interface counters
pub const DEFAULT_SOURCE_PATH: &str = "/proc/net/dev";

/// Reads the counter table straight from a file, fresh on every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    /// Read from [`DEFAULT_SOURCE_PATH`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SOURCE_PATH)
    }

    /// Read from a custom table location
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for ProcNetDev {
    fn read(&self) -> Result<Snapshot> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::from_io(self.path.display().to_string(), &e))?;
        Ok(parse_table(&text))
    }
}

/// Obtains the counter table from the stdout of an external command.
///
/// The spawn is the only blocking point of a tick; a failed spawn or a
/// non-zero exit is reported as [`Error::SourceUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `cat /proc/net/dev`
    #[must_use]
    pub fn cat_proc_net_dev() -> Self {
        Self::new("cat", [DEFAULT_SOURCE_PATH])
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CounterSource for CommandSource {
    fn read(&self) -> Result<Snapshot> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| Error::from_io(self.command_line(), &e))?;

        if !output.status.success() {
            return Err(Error::source_unavailable(
                self.command_line(),
                format!("command exited with {}", output.status),
            ));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| Error::source_unavailable(self.command_line(), e.to_string()))?;
        Ok(parse_table(&text))
    }
}

/// Serves a fixed counter table, e.g. one recorded on another machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSource {
    table: String,
}

impl StaticSource {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl CounterSource for StaticSource {
    fn read(&self) -> Result<Snapshot> {
        Ok(parse_table(&self.table))
    }
}

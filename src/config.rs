use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "serde-support")]
use log::{info, warn};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde-support")]
use std::path::Path;

use crate::counter::DEFAULT_SOURCE_PATH;
use crate::filter::{InterfaceFilter, DEFAULT_IGNORED_PREFIXES};
use crate::{Error, Result};

/// Default refresh interval of the monitor, in seconds
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3;

/// Static settings of a speed monitor, fixed for the lifetime of the process.
///
/// With the `serde-support` feature the settings can be read from TOML; every
/// field is optional there:
///
/// ```toml
/// refresh_interval_secs = 2
/// ignored_interface_prefixes = ["lo", "docker", "veth"]
/// source_path = "/proc/net/dev"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct Config {
    /// Seconds between two sampling cycles
    pub refresh_interval_secs: u64,
    /// Interfaces whose names start with one of these are not counted
    pub ignored_interface_prefixes: Vec<String>,
    /// Location of the counter table
    pub source_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            ignored_interface_prefixes: DEFAULT_IGNORED_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn with_ignored_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_interface_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the refresh interval is zero or an ignore
    /// prefix is empty (which would exclude every interface).
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(Error::config_error("refresh interval must be positive"));
        }
        if self.ignored_interface_prefixes.iter().any(String::is_empty) {
            return Err(Error::config_error(
                "empty interface prefix would ignore every interface",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn interval_secs_f64(&self) -> f64 {
        self.refresh_interval_secs as f64
    }

    #[must_use]
    pub fn filter(&self) -> InterfaceFilter {
        InterfaceFilter::new(self.ignored_interface_prefixes.iter().cloned())
    }
}

#[cfg(feature = "serde-support")]
impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the document is not valid TOML, has
    /// fields of the wrong type, or fails [`Config::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_error(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config_error(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Read a TOML configuration file, falling back to defaults when it is
    /// absent or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {}. Using defaults.", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }
}

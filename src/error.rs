use std::io;

/// The error type for throughput sampling operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The counter source could not be read this cycle
    #[error("Counter source {resource} unavailable: {reason}")]
    SourceUnavailable { resource: String, reason: String },

    /// A single line of the counter table did not have the expected shape
    #[error("Malformed counter line '{line}': {reason}")]
    MalformedLine { line: String, reason: String },

    /// Configuration is invalid or could not be loaded
    #[error("Configuration error: {details}")]
    Config { details: String },

    /// The async monitor needs a tokio runtime that is not available
    #[error("Runtime error: {details}")]
    Runtime { details: String },
}

impl Error {
    /// Create a new source unavailable error
    pub fn source_unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create a source unavailable error from an I/O failure
    pub fn from_io(resource: impl Into<String>, err: &io::Error) -> Self {
        let reason = match err.kind() {
            io::ErrorKind::NotFound => "not found".to_string(),
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => err.to_string(),
        };
        Self::source_unavailable(resource, reason)
    }

    /// Create a new malformed line error
    pub fn malformed_line(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }

    /// Create a new runtime error
    pub fn runtime(details: impl Into<String>) -> Self {
        Self::Runtime {
            details: details.into(),
        }
    }

    /// Returns true if a tick that failed with this error can simply be
    /// skipped and retried on the next cycle.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::MalformedLine { .. })
    }
}

/// A specialized `Result` type for throughput sampling operations.
pub type Result<T> = std::result::Result<T, Error>;

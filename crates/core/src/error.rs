use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// Only [`MonitorError::Config`] and [`MonitorError::Sink`] raised during
/// startup are fatal. Everything else is contained at device or metric
/// granularity and rendered as `N/A`.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(String),

    /// A platform attribute could not be read or parsed.
    #[error("cannot read {attribute} of {device}: {reason}")]
    ReadFailure {
        device:    String,
        attribute: String,
        reason:    String,
    },

    /// The thermal or battery subsystem is absent on this platform.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MonitorError {
    pub fn read_failure(
        device: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::ReadFailure {
            device:    device.into(),
            attribute: attribute.into(),
            reason:    reason.to_string(),
        }
    }
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;

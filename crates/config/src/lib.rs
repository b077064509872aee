pub mod schema;
pub mod watcher;

pub use schema::{
    BatteryBackend, BatteryConfig, DiskConfig, MonitorConfig, PollConfig, TemperatureConfig,
};
pub use watcher::ConfigWatcher;

use hostmon_core::{MonitorError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `MonitorConfig::default()` if
/// the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(MonitorConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<MonitorConfig> {
    let config: MonitorConfig =
        toml::from_str(raw).map_err(|e| MonitorError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Reject settings the poll loop cannot run with.
pub fn validate(config: &MonitorConfig) -> Result<()> {
    if config.poll.interval_ms == 0 {
        return Err(MonitorError::Config("poll.interval_ms must be greater than 0".into()));
    }
    if config.poll.read_timeout_ms == 0 {
        return Err(MonitorError::Config("poll.read_timeout_ms must be greater than 0".into()));
    }
    if config.battery.device_prefix.is_empty() {
        return Err(MonitorError::Config("battery.device_prefix must not be empty".into()));
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("hostmon").join("hostmon.toml")
}

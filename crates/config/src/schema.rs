use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `hostmon.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Poll cadence and read bounds.
    pub poll: PollConfig,
    /// Battery source selection and display.
    pub battery: BatteryConfig,
    /// Which sensor group feeds the temperature label.
    pub temperature: TemperatureConfig,
    /// Which filesystem feeds the disk label.
    pub disk: DiskConfig,
}

/// Poll loop timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub interval_ms: u64,
    /// Upper bound for a single battery device read.
    pub read_timeout_ms: u64,
    /// Window over which CPU usage is sampled each cycle.
    pub cpu_sample_ms: u64,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn cpu_sample(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms:     2_000,
            read_timeout_ms: 500,
            cpu_sample_ms:   1_000,
        }
    }
}

/// How battery devices are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatteryBackend {
    /// sysfs on Linux, the snapshot backend elsewhere.
    #[default]
    Auto,
    /// Per-device energy counters under `power_supply_dir`.
    Sysfs,
    /// One aggregate battery from the platform battery API.
    Snapshot,
    /// Never poll batteries.
    None,
}

/// Battery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub backend: BatteryBackend,
    /// Directory holding one sub-directory per power supply.
    pub power_supply_dir: PathBuf,
    /// Only entries whose name starts with this prefix are batteries.
    pub device_prefix: String,
    /// Append the time-to-full estimate while charging.
    pub show_time_to_full: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            backend:           BatteryBackend::Auto,
            power_supply_dir:  PathBuf::from("/sys/class/power_supply"),
            device_prefix:     "BAT".to_string(),
            show_time_to_full: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Sensor group shown, e.g. `"coretemp"` or `"k10temp"`.
    pub sensor_group: String,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self { sensor_group: "coretemp".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub mount_point: PathBuf,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self { mount_point: PathBuf::from("/") }
    }
}

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A point-in-time snapshot of host resource usage.
///
/// Percentages are `None` when that one metric could not be measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// Average CPU usage across all cores (0.0 – 100.0).
    pub cpu_percent: Option<f32>,
    /// RAM usage (0.0 – 100.0).
    pub memory_percent: Option<f32>,
    /// Usage of the watched filesystem (0.0 – 100.0).
    pub disk_percent: Option<f32>,
    /// Bytes sent since boot, summed over all interfaces.
    pub net_sent_bytes: u64,
    /// Bytes received since boot, summed over all interfaces.
    pub net_recv_bytes: u64,
    /// Sensor group name → current temperature of each sensor in °C.
    /// Empty when the platform exposes no thermal sensors.
    pub temperatures: BTreeMap<String, Vec<f32>>,
}

impl SystemSnapshot {
    /// First sensor of `group`, if the group exists and has any reading.
    #[must_use]
    pub fn first_temperature(&self, group: &str) -> Option<f32> {
        self.temperatures.get(group)?.first().copied()
    }
}

/// Charging direction of a battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    /// Anything else the platform reports ("Full", "Not charging", …).
    /// The raw label is kept for display.
    Unknown(String),
}

impl BatteryStatus {
    /// Interpret a sysfs-style status label.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Charging"    => Self::Charging,
            "Discharging" => Self::Discharging,
            other         => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Charging      => "Charging",
            Self::Discharging   => "Discharging",
            Self::Unknown(raw) if !raw.is_empty() => raw.as_str(),
            Self::Unknown(_)    => "Unknown",
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated time until empty (discharging) or full (charging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeRemaining {
    Seconds(u64),
    /// Running on unlimited power; no estimate applies.
    Unlimited,
    /// No estimate could be derived (zero or missing power draw).
    Unresolved,
}

impl TimeRemaining {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// The part of a battery reading that is either entirely present or absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryCharge {
    /// Charge level in `[0, 100]`.
    pub percent: f32,
    pub status: BatteryStatus,
    pub time_remaining: TimeRemaining,
}

/// One battery device as observed during a single poll tick.
///
/// Rebuilt from live platform reads every tick and dropped once handed to the
/// sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    pub device_id: String,
    /// `None` when the device could not be read this tick.
    pub charge: Option<BatteryCharge>,
}

impl BatteryReading {
    pub fn new(device_id: impl Into<String>, charge: BatteryCharge) -> Self {
        Self { device_id: device_id.into(), charge: Some(charge) }
    }

    /// A reading for a device whose attributes could not be read.
    pub fn unavailable(device_id: impl Into<String>) -> Self {
        Self { device_id: device_id.into(), charge: None }
    }

    pub fn percent(&self) -> Option<f32> {
        self.charge.as_ref().map(|c| c.percent)
    }
}

/// Display urgency of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

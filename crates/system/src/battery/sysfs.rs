//! Energy-counter batteries read from a Linux `power_supply` sysfs tree.
//!
//! Each device is a directory (`/sys/class/power_supply/BAT0`, …) holding one
//! attribute per file. `capacity` and `status` are mandatory; the energy and
//! power counters depend on the hardware. Devices that only expose charge
//! counters (`charge_now`, `charge_full`, `current_now`, in µAh / µA) are read
//! through the same ratio, since µAh / µA is hours just like µWh / µW.

use super::InFlight;
use hostmon_core::{BatteryCharge, BatteryStatus, MonitorError, Result, TimeRemaining};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

const SECS_PER_HOUR: u128 = 3_600;

/// Raw attributes of one power-supply device, as read this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyCounters {
    /// `capacity`, percent.
    pub capacity: u32,
    /// `status`, e.g. `"Discharging"`.
    pub status: String,
    /// `energy_now` (or `charge_now`).
    pub now: Option<u64>,
    /// `energy_full` (or `charge_full`).
    pub full: Option<u64>,
    /// Absolute value of `power_now` (or `current_now`).
    pub rate: Option<u64>,
}

impl EnergyCounters {
    pub fn time_remaining(&self, status: &BatteryStatus) -> TimeRemaining {
        estimate_time(status, self.now, self.full, self.rate)
    }

    /// Derive the normalized charge state.
    pub fn into_charge(self) -> BatteryCharge {
        let status = BatteryStatus::parse(&self.status);
        let time_remaining = self.time_remaining(&status);
        BatteryCharge {
            percent: self.capacity.min(100) as f32,
            status,
            time_remaining,
        }
    }
}

/// Time to empty (discharging) or to full (charging) from energy counters.
///
/// Unresolved whenever the draw is missing or zero, the status gives no
/// direction, or a charging battery does not report its full capacity.
pub fn estimate_time(
    status: &BatteryStatus,
    now: Option<u64>,
    full: Option<u64>,
    rate: Option<u64>,
) -> TimeRemaining {
    let (Some(now), Some(rate)) = (now, rate) else {
        return TimeRemaining::Unresolved;
    };
    if rate == 0 {
        return TimeRemaining::Unresolved;
    }

    let remaining = match (status, full) {
        (BatteryStatus::Discharging, _) => now,
        (BatteryStatus::Charging, Some(full)) => full.saturating_sub(now),
        _ => return TimeRemaining::Unresolved,
    };

    let secs = u128::from(remaining) * SECS_PER_HOUR / u128::from(rate);
    TimeRemaining::Seconds(u64::try_from(secs).unwrap_or(u64::MAX))
}

/// The set of sysfs batteries polled for the process lifetime.
#[derive(Debug, Clone)]
pub struct SysfsBatteries {
    root:      PathBuf,
    devices:   Vec<String>,
    in_flight: Arc<InFlight>,
}

impl SysfsBatteries {
    /// Enumerate every entry of `root` whose name starts with `prefix`.
    pub fn scan(root: impl Into<PathBuf>, prefix: &str) -> Result<Self> {
        let root = root.into();
        let entries = fs::read_dir(&root).map_err(|e| {
            MonitorError::SensorUnavailable(format!("{}: {e}", root.display()))
        })?;

        let mut devices: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(prefix))
            .collect();
        devices.sort();

        Ok(Self::with_devices(root, devices))
    }

    /// Use a fixed device list instead of scanning.
    pub fn with_devices(root: impl Into<PathBuf>, devices: Vec<String>) -> Self {
        Self { root: root.into(), devices, in_flight: Arc::default() }
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub(crate) fn in_flight(&self) -> &Arc<InFlight> {
        &self.in_flight
    }

    /// Read every attribute of `device`.
    ///
    /// Fails when a mandatory attribute is missing or when any present
    /// attribute is unreadable or malformed.
    pub fn read_counters(&self, device: &str) -> Result<EnergyCounters> {
        let capacity = self.require(device, "capacity")?;
        let capacity = capacity
            .parse::<u32>()
            .map_err(|e| MonitorError::read_failure(device, "capacity", e))?;
        let status = self.require(device, "status")?;

        let (now, full, rate) = match self.read_int(device, "energy_now")? {
            Some(now) => (
                Some(now),
                self.read_int(device, "energy_full")?,
                self.read_int(device, "power_now")?,
            ),
            None => (
                self.read_int(device, "charge_now")?,
                self.read_int(device, "charge_full")?,
                self.read_int(device, "current_now")?,
            ),
        };

        Ok(EnergyCounters {
            capacity,
            status,
            now:  now.map(non_negative),
            full: full.map(non_negative),
            rate: rate.map(i64::unsigned_abs),
        })
    }

    pub fn read_charge(&self, device: &str) -> Result<BatteryCharge> {
        self.read_counters(device).map(EnergyCounters::into_charge)
    }

    fn read_attr(&self, device: &str, name: &str) -> Result<Option<String>> {
        let path = self.root.join(device).join(name);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MonitorError::read_failure(device, name, e)),
        }
    }

    fn require(&self, device: &str, name: &str) -> Result<String> {
        self.read_attr(device, name)?
            .ok_or_else(|| MonitorError::read_failure(device, name, "attribute missing"))
    }

    fn read_int(&self, device: &str, name: &str) -> Result<Option<i64>> {
        self.read_attr(device, name)?
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|e| MonitorError::read_failure(device, name, format!("{e}: {raw:?}")))
            })
            .transpose()
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

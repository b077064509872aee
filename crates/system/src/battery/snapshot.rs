//! Consolidated-snapshot batteries: one aggregate reading per tick.

use hostmon_core::{BatteryCharge, BatteryStatus, MonitorError, Result, TimeRemaining};
use starship_battery::{
    units::{energy::joule, power::watt},
    Manager, State,
};
use super::InFlight;
use std::fmt;
use std::sync::Arc;

/// Device id reported for the single aggregate battery.
pub const SNAPSHOT_DEVICE_ID: &str = "BATTERY";

/// Seconds left as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecsLeft {
    Seconds(u64),
    /// Sentinel: on external power, no estimate applies.
    Unlimited,
    /// The platform could not estimate.
    Unknown,
}

/// One aggregate reading from the platform battery API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSnapshot {
    pub percent:   f32,
    pub plugged:   bool,
    pub secs_left: SecsLeft,
}

impl PowerSnapshot {
    pub fn into_charge(self) -> BatteryCharge {
        let status = if self.plugged {
            BatteryStatus::Charging
        } else {
            BatteryStatus::Discharging
        };
        let time_remaining = match self.secs_left {
            SecsLeft::Seconds(secs) => TimeRemaining::Seconds(secs),
            SecsLeft::Unlimited     => TimeRemaining::Unlimited,
            SecsLeft::Unknown       => TimeRemaining::Unresolved,
        };
        BatteryCharge {
            percent: self.percent.clamp(0.0, 100.0),
            status,
            time_remaining,
        }
    }
}

/// Single-call snapshot primitive.
pub trait SnapshotProvider: Send + Sync {
    /// Read the aggregate battery. An error means no data this tick.
    fn snapshot(&self) -> Result<PowerSnapshot>;
}

/// A battery source backed by a [`SnapshotProvider`].
pub struct SnapshotBattery {
    device_id: String,
    provider:  Box<dyn SnapshotProvider>,
    in_flight: Arc<InFlight>,
}

impl SnapshotBattery {
    pub fn new(provider: impl SnapshotProvider + 'static) -> Self {
        Self {
            device_id: SNAPSHOT_DEVICE_ID.to_string(),
            provider:  Box::new(provider),
            in_flight: Arc::default(),
        }
    }

    /// The synthetic device list: always exactly one entry.
    pub fn devices(&self) -> &[String] {
        std::slice::from_ref(&self.device_id)
    }

    pub(crate) fn in_flight(&self) -> &Arc<InFlight> {
        &self.in_flight
    }

    pub fn read_charge(&self) -> Result<BatteryCharge> {
        self.provider.snapshot().map(PowerSnapshot::into_charge)
    }
}

impl fmt::Debug for SnapshotBattery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotBattery")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

/// Aggregates every battery the `starship-battery` crate can see.
///
/// On external power the time estimate is [`SecsLeft::Unlimited`];
/// otherwise it is total stored energy over total discharge rate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StarshipProvider;

impl StarshipProvider {
    /// Fails unless at least one battery can be read right now.
    pub fn probe() -> Result<Self> {
        let provider = Self;
        provider.snapshot()?;
        Ok(provider)
    }
}

impl SnapshotProvider for StarshipProvider {
    fn snapshot(&self) -> Result<PowerSnapshot> {
        let manager = Manager::new()
            .map_err(|e| MonitorError::SensorUnavailable(format!("battery manager: {e}")))?;
        let batteries = manager
            .batteries()
            .map_err(|e| MonitorError::SensorUnavailable(format!("battery list: {e}")))?;

        let mut energy  = 0.0_f32;
        let mut full    = 0.0_f32;
        let mut rate    = 0.0_f32;
        let mut plugged = false;

        for battery in batteries {
            let battery = battery
                .map_err(|e| MonitorError::read_failure(SNAPSHOT_DEVICE_ID, "battery", e))?;
            energy  += battery.energy().get::<joule>();
            full    += battery.energy_full().get::<joule>();
            rate    += battery.energy_rate().get::<watt>();
            plugged |= matches!(battery.state(), State::Charging | State::Full);
        }

        if full <= 0.0 {
            return Err(MonitorError::SensorUnavailable("no battery reported".into()));
        }

        let secs_left = if plugged {
            SecsLeft::Unlimited
        } else if rate > 0.0 {
            SecsLeft::Seconds((energy / rate) as u64)
        } else {
            SecsLeft::Unknown
        };

        Ok(PowerSnapshot {
            percent: energy / full * 100.0,
            plugged,
            secs_left,
        })
    }
}

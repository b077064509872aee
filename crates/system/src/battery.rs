//! Battery state, normalized across platforms.
//!
//! The platform capability is detected once at startup and fixed for the
//! process lifetime as a [`BatterySource`] variant:
//! - Linux exposes raw sysfs energy counters per device ([`SysfsBatteries`]).
//! - Other platforms expose one aggregate snapshot ([`SnapshotBattery`]).
//! - Desktops and VMs may have neither ([`BatterySource::None`]).

pub mod snapshot;
pub mod sysfs;

pub use snapshot::{
    PowerSnapshot, SecsLeft, SnapshotBattery, SnapshotProvider, StarshipProvider,
    SNAPSHOT_DEVICE_ID,
};
pub use sysfs::{estimate_time, EnergyCounters, SysfsBatteries};

use hostmon_config::{BatteryBackend, BatteryConfig};
use hostmon_core::{BatteryReading, MonitorError, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum BatterySource {
    EnergyCounter(Arc<SysfsBatteries>),
    Snapshot(Arc<SnapshotBattery>),
    None,
}

impl BatterySource {
    /// Pick the battery backend for this platform and enumerate its devices.
    ///
    /// An absent subsystem is expected and yields [`BatterySource::None`].
    pub fn detect(config: &BatteryConfig) -> Self {
        let backend = match config.backend {
            BatteryBackend::Auto if cfg!(target_os = "linux") => BatteryBackend::Sysfs,
            BatteryBackend::Auto => BatteryBackend::Snapshot,
            other => other,
        };

        let source = match backend {
            BatteryBackend::Sysfs => {
                SysfsBatteries::scan(&config.power_supply_dir, &config.device_prefix)
                    .map(Self::energy_counter)
            }
            BatteryBackend::Snapshot => {
                StarshipProvider::probe().map(|p| Self::snapshot(SnapshotBattery::new(p)))
            }
            BatteryBackend::None | BatteryBackend::Auto => Ok(Self::None),
        };

        match source {
            Ok(source) if source.devices().is_empty() => {
                info!("No battery devices found");
                Self::None
            }
            Ok(source) => {
                info!(
                    "Polling {} battery device(s) via {:?}: {:?}",
                    source.devices().len(),
                    backend,
                    source.devices()
                );
                source
            }
            Err(e) => {
                info!("Battery subsystem unavailable: {e}");
                Self::None
            }
        }
    }

    pub fn energy_counter(batteries: SysfsBatteries) -> Self {
        Self::EnergyCounter(Arc::new(batteries))
    }

    pub fn snapshot(battery: SnapshotBattery) -> Self {
        Self::Snapshot(Arc::new(battery))
    }

    /// Devices polled each tick, in reading order.
    pub fn devices(&self) -> &[String] {
        match self {
            Self::EnergyCounter(batteries) => batteries.devices(),
            Self::Snapshot(battery)        => battery.devices(),
            Self::None                     => &[],
        }
    }

    /// Read every device once.
    ///
    /// Each read runs on the blocking pool and is bounded by `timeout`. A
    /// device that fails or times out yields an all-absent reading; the
    /// remaining devices are still read. A timed-out read keeps its blocking
    /// thread until the platform call returns, and the device is skipped
    /// (reads as absent) until then, so a hung attribute holds at most one
    /// thread.
    pub async fn read_all(&self, timeout: Duration) -> Vec<BatteryReading> {
        let mut readings = Vec::with_capacity(self.devices().len());

        for device in self.devices() {
            let outcome = match self {
                Self::EnergyCounter(batteries) => {
                    let reader = Arc::clone(batteries);
                    let id = device.clone();
                    bounded(batteries.in_flight(), device, timeout, move || reader.read_charge(&id))
                        .await
                }
                Self::Snapshot(battery) => {
                    let reader = Arc::clone(battery);
                    bounded(battery.in_flight(), device, timeout, move || reader.read_charge())
                        .await
                }
                Self::None => continue,
            };

            readings.push(match outcome {
                Ok(charge) => BatteryReading::new(device.as_str(), charge),
                Err(e) => {
                    warn!("Error reading battery {device}: {e}");
                    BatteryReading::unavailable(device.as_str())
                }
            });
        }

        readings
    }
}

/// Devices with a blocking read still running.
#[derive(Debug, Default)]
pub(crate) struct InFlight(Mutex<HashSet<String>>);

impl InFlight {
    /// `None` while an earlier read of `device` has not returned.
    fn claim(self: &Arc<Self>, device: &str) -> Option<Claim> {
        let mut busy = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(device.to_string()) {
            return None;
        }
        Some(Claim { owner: Arc::clone(self), device: device.to_string() })
    }
}

/// Releases its device when the blocking read finishes, timed out or not.
struct Claim {
    owner:  Arc<InFlight>,
    device: String,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut busy = self.owner.0.lock().unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.device);
    }
}

/// Run a blocking read on the blocking pool, failing after `timeout`.
async fn bounded<T, F>(
    in_flight: &Arc<InFlight>,
    device: &str,
    timeout: Duration,
    read: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let Some(claim) = in_flight.claim(device) else {
        return Err(MonitorError::read_failure(device, "device", "previous read still pending"));
    };
    let task = tokio::task::spawn_blocking(move || {
        let _claim = claim;
        read()
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(MonitorError::read_failure(device, "device", join)),
        Err(_) => Err(MonitorError::read_failure(
            device,
            "device",
            format!("timed out after {timeout:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::snapshot::tests::FixedProvider;
    use super::sysfs::tests::fake_device;
    use super::*;
    use hostmon_core::{BatteryStatus, TimeRemaining};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_millis(500);

    struct SlowProvider(Duration);

    impl SnapshotProvider for SlowProvider {
        fn snapshot(&self) -> Result<PowerSnapshot> {
            std::thread::sleep(self.0);
            Ok(PowerSnapshot { percent: 50.0, plugged: false, secs_left: SecsLeft::Unknown })
        }
    }

    #[tokio::test]
    async fn failing_device_does_not_stop_others() {
        let td = TempDir::new().unwrap();
        fake_device(&td, "BAT0", &[("status", "Discharging")]);
        fake_device(
            &td,
            "BAT1",
            &[
                ("capacity", "88"),
                ("status", "Discharging"),
                ("energy_now", "5000"),
                ("power_now", "2500"),
            ],
        );
        let source = BatterySource::energy_counter(SysfsBatteries::scan(td.path(), "BAT").unwrap());

        let readings = source.read_all(TIMEOUT).await;

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], BatteryReading::unavailable("BAT0"));
        assert_eq!(readings[1].device_id, "BAT1");
        let charge = readings[1].charge.as_ref().unwrap();
        assert_eq!(charge.percent, 88.0);
        assert_eq!(charge.time_remaining, TimeRemaining::Seconds(7_200));
    }

    #[tokio::test]
    async fn device_removed_after_scan_reads_as_unavailable() {
        let td = TempDir::new().unwrap();
        fake_device(&td, "BAT0", &[("capacity", "50"), ("status", "Charging")]);
        let source = BatterySource::energy_counter(SysfsBatteries::scan(td.path(), "BAT").unwrap());

        std::fs::remove_dir_all(td.path().join("BAT0")).unwrap();

        let readings = source.read_all(TIMEOUT).await;
        assert_eq!(readings, vec![BatteryReading::unavailable("BAT0")]);
    }

    #[tokio::test]
    async fn snapshot_source_yields_one_synthetic_device() {
        let source = BatterySource::snapshot(SnapshotBattery::new(FixedProvider(Some(
            PowerSnapshot { percent: 55.0, plugged: true, secs_left: SecsLeft::Unlimited },
        ))));

        let readings = source.read_all(TIMEOUT).await;

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].device_id, SNAPSHOT_DEVICE_ID);
        let charge = readings[0].charge.as_ref().unwrap();
        assert_eq!(charge.status, BatteryStatus::Charging);
        assert_eq!(charge.time_remaining, TimeRemaining::Unlimited);
    }

    #[tokio::test]
    async fn failed_snapshot_is_all_absent() {
        let source = BatterySource::snapshot(SnapshotBattery::new(FixedProvider(None)));
        let readings = source.read_all(TIMEOUT).await;
        assert_eq!(readings, vec![BatteryReading::unavailable(SNAPSHOT_DEVICE_ID)]);
    }

    #[tokio::test]
    async fn slow_read_times_out_as_failure() {
        let source = BatterySource::snapshot(SnapshotBattery::new(SlowProvider(
            Duration::from_millis(300),
        )));
        let readings = source.read_all(Duration::from_millis(20)).await;
        assert_eq!(readings, vec![BatteryReading::unavailable(SNAPSHOT_DEVICE_ID)]);
    }

    /// Counts calls and blocks each one for a fixed delay.
    struct CountingSlow {
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl SnapshotProvider for CountingSlow {
        fn snapshot(&self) -> Result<PowerSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Ok(PowerSnapshot { percent: 50.0, plugged: false, secs_left: SecsLeft::Unknown })
        }
    }

    #[tokio::test]
    async fn hung_device_is_skipped_until_its_read_returns() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = BatterySource::snapshot(SnapshotBattery::new(CountingSlow {
            delay: Duration::from_millis(300),
            calls: Arc::clone(&calls),
        }));
        let short = Duration::from_millis(20);

        let absent = vec![BatteryReading::unavailable(SNAPSHOT_DEVICE_ID)];

        assert_eq!(source.read_all(short).await, absent);
        assert_eq!(source.read_all(short).await, absent);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let readings = source.read_all(Duration::from_secs(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(readings[0].percent(), Some(50.0));
    }

    #[tokio::test]
    async fn no_battery_variant_is_a_no_op() {
        assert!(BatterySource::None.devices().is_empty());
        assert!(BatterySource::None.read_all(TIMEOUT).await.is_empty());
    }

    #[test]
    fn detect_without_power_supply_dir_is_none() {
        let td = TempDir::new().unwrap();
        let config = BatteryConfig {
            backend: BatteryBackend::Sysfs,
            power_supply_dir: td.path().join("missing"),
            ..BatteryConfig::default()
        };
        assert!(matches!(BatterySource::detect(&config), BatterySource::None));
    }

    #[test]
    fn detect_without_batteries_is_none() {
        let td = TempDir::new().unwrap();
        fake_device(&td, "AC", &[("online", "1")]);
        let config = BatteryConfig {
            backend: BatteryBackend::Sysfs,
            power_supply_dir: td.path().to_path_buf(),
            ..BatteryConfig::default()
        };
        assert!(matches!(BatterySource::detect(&config), BatterySource::None));
    }

    #[test]
    fn detect_enumerates_sysfs_devices_once() {
        let td = TempDir::new().unwrap();
        fake_device(&td, "BAT0", &[]);
        let config = BatteryConfig {
            backend: BatteryBackend::Sysfs,
            power_supply_dir: td.path().to_path_buf(),
            ..BatteryConfig::default()
        };
        let source = BatterySource::detect(&config);

        fake_device(&td, "BAT1", &[]);
        assert_eq!(source.devices(), ["BAT0"]);
    }

    #[test]
    fn backend_none_skips_detection() {
        let config = BatteryConfig { backend: BatteryBackend::None, ..BatteryConfig::default() };
        assert!(matches!(BatterySource::detect(&config), BatterySource::None));
    }
}

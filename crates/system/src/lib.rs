//! Host telemetry collection: metrics via `sysinfo` and battery state via
//! sysfs or the platform battery API.

pub mod battery;
pub mod metrics;
pub mod time;
pub mod units;

pub use battery::{BatterySource, SnapshotBattery, SnapshotProvider, SysfsBatteries};
pub use metrics::{MetricCollector, SysinfoCollector};
pub use time::format_duration;

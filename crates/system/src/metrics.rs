use crate::units::percent_of;
use hostmon_config::MonitorConfig;
use hostmon_core::SystemSnapshot;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use sysinfo::{Components, Disks, Networks, System};
use tracing::debug;

/// Point-in-time host metrics.
///
/// Every query may block (the CPU sample sleeps for its window), so callers
/// run collectors on the blocking pool. A percentage query returns `None`
/// when that metric cannot be measured this tick.
pub trait MetricCollector: Send {
    /// Average CPU usage across all cores.
    fn cpu_percent(&mut self) -> Option<f32>;
    fn memory_percent(&mut self) -> Option<f32>;
    /// Usage of the watched mount point; `None` if it is not mounted.
    fn disk_percent(&mut self) -> Option<f32>;
    /// Cumulative `(sent, received)` bytes over all interfaces.
    fn network_totals(&mut self) -> (u64, u64);
    /// Sensor group → per-sensor temperature in °C. Empty when no sensors.
    fn temperatures(&mut self) -> BTreeMap<String, Vec<f32>>;

    fn snapshot(&mut self) -> SystemSnapshot {
        let cpu_percent    = self.cpu_percent();
        let memory_percent = self.memory_percent();
        let disk_percent   = self.disk_percent();
        let (net_sent_bytes, net_recv_bytes) = self.network_totals();

        SystemSnapshot {
            cpu_percent,
            memory_percent,
            disk_percent,
            net_sent_bytes,
            net_recv_bytes,
            temperatures: self.temperatures(),
        }
    }
}

/// [`MetricCollector`] backed by `sysinfo`.
pub struct SysinfoCollector {
    sys:         System,
    networks:    Networks,
    cpu_sample:  Duration,
    mount_point: PathBuf,
}

impl SysinfoCollector {
    pub fn new(cpu_sample: Duration, mount_point: impl Into<PathBuf>) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();

        Self {
            sys,
            networks:    Networks::new_with_refreshed_list(),
            cpu_sample:  cpu_sample.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            mount_point: mount_point.into(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.poll.cpu_sample(), config.disk.mount_point.clone())
    }
}

impl MetricCollector for SysinfoCollector {
    fn cpu_percent(&mut self) -> Option<f32> {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(self.cpu_sample);
        self.sys.refresh_cpu_usage();
        Some(self.sys.global_cpu_usage()).filter(|p| p.is_finite())
    }

    fn memory_percent(&mut self) -> Option<f32> {
        self.sys.refresh_memory();
        percent_of(self.sys.used_memory(), self.sys.total_memory())
    }

    fn disk_percent(&mut self) -> Option<f32> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .find(|d| d.mount_point() == self.mount_point.as_path());
        let Some(disk) = disk else {
            debug!("Mount point '{}' not found", self.mount_point.display());
            return None;
        };
        let used = disk.total_space().saturating_sub(disk.available_space());
        percent_of(used, disk.total_space())
    }

    fn network_totals(&mut self) -> (u64, u64) {
        self.networks.refresh(false); // false = keep existing interfaces list
        self.networks.iter().fold((0, 0), |(sent, recv), (_, data)| {
            (sent + data.total_transmitted(), recv + data.total_received())
        })
    }

    fn temperatures(&mut self) -> BTreeMap<String, Vec<f32>> {
        let components = Components::new_with_refreshed_list();
        group_sensors(
            components
                .list()
                .iter()
                .filter_map(|c| c.temperature().map(|t| (c.label(), t))),
        )
    }
}

/// Group sensors by the first word of their label, e.g. `"coretemp Core 0"`
/// lands in `"coretemp"`. Non-finite readings are dropped.
pub fn group_sensors<'a>(
    sensors: impl IntoIterator<Item = (&'a str, f32)>,
) -> BTreeMap<String, Vec<f32>> {
    let mut groups: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    for (label, temperature) in sensors {
        if !temperature.is_finite() {
            continue;
        }
        let group = label.split_whitespace().next().unwrap_or(label);
        groups.entry(group.to_string()).or_default().push(temperature);
    }
    groups
}

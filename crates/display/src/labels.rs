use crate::classify::{classify, ClassifyOptions};
use hostmon_config::MonitorConfig;
use hostmon_core::{BatteryReading, LabelUpdate, SystemSnapshot};
use hostmon_system::units::format_megabytes;

pub const NOT_AVAILABLE: &str = "N/A";

pub const CPU_LABEL:         &str = "cpu";
pub const RAM_LABEL:         &str = "ram";
pub const DISK_LABEL:        &str = "disk";
pub const NETWORK_LABEL:     &str = "network";
pub const TEMPERATURE_LABEL: &str = "temperature";

/// Label key of a battery device, e.g. `"battery:BAT0"`.
pub fn battery_label(device_id: &str) -> String {
    format!("battery:{device_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    pub classify: ClassifyOptions,
    /// Sensor group shown on the temperature label.
    pub sensor_group: String,
}

impl FrameOptions {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            classify: ClassifyOptions {
                show_time_to_full: config.battery.show_time_to_full,
            },
            sensor_group: config.temperature.sensor_group.clone(),
        }
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

/// Build every label update for one tick.
///
/// `metrics` is `None` when the collection itself failed; each metric label
/// then reads `N/A`. A single unmeasured metric reads `N/A` on its own.
/// Batteries follow in device order.
pub fn frame(
    metrics: Option<&SystemSnapshot>,
    batteries: &[BatteryReading],
    options: &FrameOptions,
) -> Vec<LabelUpdate> {
    let mut updates = metric_updates(metrics, &options.sensor_group);
    updates.extend(batteries.iter().map(|r| battery_update(r, &options.classify)));
    updates
}

pub fn battery_update(reading: &BatteryReading, options: &ClassifyOptions) -> LabelUpdate {
    let display = classify(reading, options);
    let update = LabelUpdate::new(battery_label(&reading.device_id), display.text)
        .with_tier(display.tier);
    match display.icon {
        Some(icon) => update.with_icon(icon),
        None => update,
    }
}

fn metric_updates(metrics: Option<&SystemSnapshot>, sensor_group: &str) -> Vec<LabelUpdate> {
    let Some(m) = metrics else {
        return vec![
            LabelUpdate::new(CPU_LABEL, format!("CPU: {NOT_AVAILABLE}")),
            LabelUpdate::new(RAM_LABEL, format!("RAM: {NOT_AVAILABLE}")),
            LabelUpdate::new(DISK_LABEL, format!("Disk: {NOT_AVAILABLE}")),
            LabelUpdate::new(NETWORK_LABEL, format!("Network: {NOT_AVAILABLE}")),
            LabelUpdate::new(TEMPERATURE_LABEL, format!("Temperature: {NOT_AVAILABLE}")),
        ];
    };

    let temperature = match m.first_temperature(sensor_group) {
        Some(t) => format!("Temperature: {t:.1}°C"),
        None    => format!("Temperature: {NOT_AVAILABLE}"),
    };

    vec![
        LabelUpdate::new(CPU_LABEL, percent_text("CPU", m.cpu_percent)),
        LabelUpdate::new(RAM_LABEL, percent_text("RAM", m.memory_percent)),
        LabelUpdate::new(DISK_LABEL, percent_text("Disk", m.disk_percent)),
        LabelUpdate::new(
            NETWORK_LABEL,
            format!(
                "Upload: {} | Download: {}",
                format_megabytes(m.net_sent_bytes),
                format_megabytes(m.net_recv_bytes)
            ),
        ),
        LabelUpdate::new(TEMPERATURE_LABEL, temperature),
    ]
}

fn percent_text(name: &str, percent: Option<f32>) -> String {
    match percent {
        Some(p) => format!("{name}: {p:.1}%"),
        None    => format!("{name}: {NOT_AVAILABLE}"),
    }
}

use hostmon_config::MonitorConfig;
use hostmon_core::{Frame, PresentationSink, Result, Tier};
use hostmon_display::{frame, FrameOptions};
use hostmon_poller::{shutdown, Poller, ShutdownTrigger};
use hostmon_system::battery::{PowerSnapshot, SecsLeft};
use hostmon_system::{BatterySource, MetricCollector, SnapshotBattery, SnapshotProvider, SysfsBatteries};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

struct Idle;

impl MetricCollector for Idle {
    fn cpu_percent(&mut self) -> Option<f32> { Some(3.0) }
    fn memory_percent(&mut self) -> Option<f32> { Some(41.0) }
    fn disk_percent(&mut self) -> Option<f32> { Some(60.0) }
    fn network_totals(&mut self) -> (u64, u64) { (0, 1 << 20) }
    fn temperatures(&mut self) -> BTreeMap<String, Vec<f32>> {
        BTreeMap::from([("coretemp".to_string(), vec![48.0])])
    }
}

struct OneShot {
    frames:  Vec<Frame>,
    trigger: ShutdownTrigger,
}

impl PresentationSink for OneShot {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        self.trigger.trigger();
        Ok(())
    }
}

struct OnMains;

impl SnapshotProvider for OnMains {
    fn snapshot(&self) -> Result<PowerSnapshot> {
        Ok(PowerSnapshot { percent: 88.0, plugged: false, secs_left: SecsLeft::Unlimited })
    }
}

fn write_device(root: &Path, device: &str, attrs: &[(&str, &str)]) {
    let dir = root.join(device);
    fs::create_dir_all(&dir).unwrap();
    for (name, value) in attrs {
        fs::write(dir.join(name), format!("{value}\n")).unwrap();
    }
}

async fn single_frame(batteries: BatterySource, config: &MonitorConfig) -> Frame {
    let (trigger, shutdown) = shutdown::channel();
    let sink = OneShot { frames: Vec::new(), trigger };
    let poller = Poller::new(Idle, batteries, sink, config);

    let mut sink = tokio::time::timeout(Duration::from_secs(5), poller.run(shutdown))
        .await
        .unwrap();
    assert_eq!(sink.frames.len(), 1);
    sink.frames.remove(0)
}

#[tokio::test]
async fn sysfs_batteries_render_independently() {
    let root = tempfile::tempdir().unwrap();
    write_device(root.path(), "BAT0", &[
        ("capacity", "50"),
        ("status", "Discharging"),
        ("energy_now", "5000"),
        ("energy_full", "10000"),
        ("power_now", "2500"),
    ]);
    write_device(root.path(), "BAT1", &[("status", "Discharging")]);
    write_device(root.path(), "AC", &[("online", "1")]);

    let sysfs = SysfsBatteries::scan(root.path(), "BAT").unwrap();
    let frame = single_frame(BatterySource::energy_counter(sysfs), &MonitorConfig::default()).await;

    let bat0 = frame.get("battery:BAT0").unwrap();
    assert_eq!(bat0.text, "BAT0: 50% ⚡ (Discharging) | 2:00:00 left");
    assert_eq!(bat0.tier, Some(Tier::Warning));

    let bat1 = frame.get("battery:BAT1").unwrap();
    assert_eq!(bat1.text, "BAT1: N/A");
    assert_eq!(bat1.tier, Some(Tier::Unknown));

    assert!(frame.get("battery:AC").is_none());
    assert_eq!(frame.get("cpu").unwrap().text, "CPU: 3.0%");
    assert_eq!(frame.get("temperature").unwrap().text, "Temperature: 48.0°C");
}

#[tokio::test]
async fn snapshot_battery_on_unlimited_power() {
    let source = BatterySource::snapshot(SnapshotBattery::new(OnMains));
    let frame = single_frame(source, &MonitorConfig::default()).await;

    let battery = frame.get("battery:BATTERY").unwrap();
    assert_eq!(battery.text, "BATTERY: 88% ⚡ (Discharging) | ∞ left");
    assert_eq!(battery.tier, Some(Tier::Healthy));
}

#[tokio::test]
async fn no_batteries_still_reports_metrics() {
    let frame = single_frame(BatterySource::None, &MonitorConfig::default()).await;

    assert_eq!(frame.updates.len(), 5);
    assert_eq!(frame.get("ram").unwrap().text, "RAM: 41.0%");
    assert_eq!(frame.get("network").unwrap().text, "Upload: 0.00 MB | Download: 1.00 MB");
}

#[tokio::test]
async fn charging_shows_time_to_full_when_enabled() {
    let root = tempfile::tempdir().unwrap();
    write_device(root.path(), "BAT0", &[
        ("capacity", "60"),
        ("status", "Charging"),
        ("energy_now", "6000"),
        ("energy_full", "10000"),
        ("power_now", "4000"),
    ]);

    let mut config = MonitorConfig::default();
    config.battery.show_time_to_full = true;
    let sysfs = SysfsBatteries::scan(root.path(), "BAT").unwrap();
    let frame = single_frame(BatterySource::energy_counter(sysfs), &config).await;

    assert_eq!(
        frame.get("battery:BAT0").unwrap().text,
        "BAT0: 60% 🔌 (Charging) | 1:00:00 to full"
    );
}

#[tokio::test]
async fn three_devices_across_both_variants() {
    let root = tempfile::tempdir().unwrap();
    write_device(root.path(), "BAT0", &[
        ("capacity", "50"),
        ("status", "Discharging"),
        ("energy_now", "5000"),
        ("power_now", "2500"),
    ]);
    write_device(root.path(), "BAT1", &[("status", "Discharging"), ("energy_now", "100")]);

    let sysfs = BatterySource::energy_counter(SysfsBatteries::scan(root.path(), "BAT").unwrap());
    let aggregate = BatterySource::snapshot(SnapshotBattery::new(OnMains));

    let timeout = Duration::from_millis(500);
    let mut readings = sysfs.read_all(timeout).await;
    readings.extend(aggregate.read_all(timeout).await);

    let updates = frame(None, &readings, &FrameOptions::default());
    let texts: Vec<&str> = updates[5..].iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, [
        "BAT0: 50% ⚡ (Discharging) | 2:00:00 left",
        "BAT1: N/A",
        "BATTERY: 88% ⚡ (Discharging) | ∞ left",
    ]);
}

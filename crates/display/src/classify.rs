use hostmon_core::{BatteryCharge, BatteryReading, BatteryStatus, Tier, TimeRemaining};
use hostmon_system::format_duration;

pub const CHARGING_ICON:    &str = "🔌";
pub const DISCHARGING_ICON: &str = "⚡";
/// Shown in place of a time when running on unlimited power.
pub const UNLIMITED_MARKER: &str = "∞";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Append the time-to-full estimate while charging. Off by default.
    pub show_time_to_full: bool,
}

/// How one battery should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryDisplay {
    pub tier: Tier,
    /// `None` for unreadable batteries.
    pub icon: Option<&'static str>,
    pub text: String,
}

/// Urgency of a charge level: `> 75` healthy, `> 30` warning, else critical.
pub fn tier_for(percent: Option<f32>) -> Tier {
    match percent {
        None                => Tier::Unknown,
        Some(p) if p > 75.0 => Tier::Healthy,
        Some(p) if p > 30.0 => Tier::Warning,
        Some(_)             => Tier::Critical,
    }
}

pub fn classify(reading: &BatteryReading, options: &ClassifyOptions) -> BatteryDisplay {
    let Some(charge) = &reading.charge else {
        return BatteryDisplay {
            tier: Tier::Unknown,
            icon: None,
            text: format!("{}: N/A", reading.device_id),
        };
    };

    let icon = if charge.status == BatteryStatus::Charging {
        CHARGING_ICON
    } else {
        DISCHARGING_ICON
    };

    let mut text = format!(
        "{}: {}% {icon} ({})",
        reading.device_id,
        format_percent(charge.percent),
        charge.status
    );
    if let Some(clause) = time_clause(charge, options) {
        text.push_str(" | ");
        text.push_str(&clause);
    }

    BatteryDisplay {
        tier: tier_for(Some(charge.percent)),
        icon: Some(icon),
        text,
    }
}

fn time_clause(charge: &BatteryCharge, options: &ClassifyOptions) -> Option<String> {
    match (&charge.status, charge.time_remaining) {
        (BatteryStatus::Discharging, TimeRemaining::Seconds(secs)) => {
            Some(format!("{} left", format_duration(secs)))
        }
        (BatteryStatus::Discharging, TimeRemaining::Unlimited) => {
            Some(format!("{UNLIMITED_MARKER} left"))
        }
        (BatteryStatus::Charging, TimeRemaining::Seconds(secs)) if options.show_time_to_full => {
            Some(format!("{} to full", format_duration(secs)))
        }
        _ => None,
    }
}

/// Two decimals at most, no trailing zeros: `80`, `41.5`, `57.33`.
fn format_percent(percent: f32) -> String {
    let rounded = (f64::from(percent) * 100.0).round() / 100.0;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(percent: f32, status: BatteryStatus, time: TimeRemaining) -> BatteryReading {
        BatteryReading::new(
            "BAT0",
            BatteryCharge { percent, status, time_remaining: time },
        )
    }

    fn discharging(percent: f32) -> BatteryReading {
        reading(percent, BatteryStatus::Discharging, TimeRemaining::Unresolved)
    }

    #[test]
    fn tier_boundaries_are_strict() {
        let opts = ClassifyOptions::default();
        assert_eq!(classify(&discharging(80.0), &opts).tier, Tier::Healthy);
        assert_eq!(classify(&discharging(75.01), &opts).tier, Tier::Healthy);
        assert_eq!(classify(&discharging(75.0), &opts).tier, Tier::Warning);
        assert_eq!(classify(&discharging(30.01), &opts).tier, Tier::Warning);
        assert_eq!(classify(&discharging(30.0), &opts).tier, Tier::Critical);
        assert_eq!(classify(&discharging(0.0), &opts).tier, Tier::Critical);
    }

    #[test]
    fn unreadable_battery_is_unknown() {
        let display = classify(&BatteryReading::unavailable("BAT1"), &ClassifyOptions::default());
        assert_eq!(display.tier, Tier::Unknown);
        assert_eq!(display.icon, None);
        assert_eq!(display.text, "BAT1: N/A");
    }

    #[test]
    fn discharging_appends_time_left() {
        let display = classify(
            &reading(50.0, BatteryStatus::Discharging, TimeRemaining::Seconds(7_200)),
            &ClassifyOptions::default(),
        );
        assert_eq!(display.icon, Some(DISCHARGING_ICON));
        assert_eq!(display.text, "BAT0: 50% ⚡ (Discharging) | 2:00:00 left");
    }

    #[test]
    fn unresolved_time_is_omitted() {
        let display = classify(&discharging(50.0), &ClassifyOptions::default());
        assert_eq!(display.text, "BAT0: 50% ⚡ (Discharging)");
    }

    #[test]
    fn unlimited_shows_marker_without_numbers() {
        let display = classify(
            &reading(41.5, BatteryStatus::Discharging, TimeRemaining::Unlimited),
            &ClassifyOptions::default(),
        );
        assert_eq!(display.text, "BAT0: 41.5% ⚡ (Discharging) | ∞ left");
    }

    #[test]
    fn time_to_full_hidden_by_default() {
        let charging = reading(60.0, BatteryStatus::Charging, TimeRemaining::Seconds(7_200));

        let display = classify(&charging, &ClassifyOptions::default());
        assert_eq!(display.icon, Some(CHARGING_ICON));
        assert_eq!(display.text, "BAT0: 60% 🔌 (Charging)");

        let display = classify(&charging, &ClassifyOptions { show_time_to_full: true });
        assert_eq!(display.text, "BAT0: 60% 🔌 (Charging) | 2:00:00 to full");
    }

    #[test]
    fn other_status_keeps_raw_label() {
        let display = classify(
            &reading(100.0, BatteryStatus::parse("Full"), TimeRemaining::Unresolved),
            &ClassifyOptions::default(),
        );
        assert_eq!(display.tier, Tier::Healthy);
        assert_eq!(display.text, "BAT0: 100% ⚡ (Full)");
    }

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(format_percent(57.333), "57.33");
        assert_eq!(format_percent(80.0), "80");
    }

    #[test]
    fn classify_is_idempotent() {
        let reading = reading(33.0, BatteryStatus::Discharging, TimeRemaining::Seconds(59));
        let opts = ClassifyOptions::default();
        assert_eq!(classify(&reading, &opts), classify(&reading, &opts));
    }
}

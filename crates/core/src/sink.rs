use crate::{error::Result, state::Tier};
use chrono::{DateTime, Local};
use serde::Serialize;

/// New text (and optional urgency) for one display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelUpdate {
    /// Stable label key, e.g. `"cpu"` or `"battery:BAT0"`.
    pub label: String,
    pub text:  String,
    /// `None` = keep the sink's default color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier:  Option<Tier>,
    /// Glyph a graphical sink can draw on its own; already part of `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon:  Option<String>,
}

impl LabelUpdate {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { label: label.into(), text: text.into(), tier: None, icon: None }
    }

    #[must_use]
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Every label update produced by one poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub taken_at: DateTime<Local>,
    pub updates:  Vec<LabelUpdate>,
}

impl Frame {
    pub fn new(updates: Vec<LabelUpdate>) -> Self {
        Self { taken_at: Local::now(), updates }
    }

    /// Look up the update for `label`, if this frame carries one.
    pub fn get(&self, label: &str) -> Option<&LabelUpdate> {
        self.updates.iter().find(|u| u.label == label)
    }
}

/// Receives one [`Frame`] per poll tick.
///
/// Called from the poll loop's own task; implementations must not block on
/// user interaction.
pub trait PresentationSink: Send {
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        (**self).present(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untiered_update_omits_tier_in_json() {
        let json = serde_json::to_string(&LabelUpdate::new("cpu", "CPU: 3.0%")).unwrap();
        assert_eq!(json, r#"{"label":"cpu","text":"CPU: 3.0%"}"#);

        let json = serde_json::to_string(
            &LabelUpdate::new("battery:BAT0", "BAT0: N/A").with_tier(Tier::Unknown),
        )
        .unwrap();
        assert!(json.ends_with(r#""tier":"unknown"}"#));

        let json = serde_json::to_string(
            &LabelUpdate::new("battery:BAT0", "BAT0: 80% ⚡ (Discharging)")
                .with_tier(Tier::Healthy)
                .with_icon("⚡"),
        )
        .unwrap();
        assert!(json.ends_with(r#""tier":"healthy","icon":"⚡"}"#));
    }

    #[test]
    fn frame_lookup_by_label() {
        let frame = Frame::new(vec![
            LabelUpdate::new("cpu", "CPU: 1.0%"),
            LabelUpdate::new("ram", "RAM: 2.0%"),
        ]);
        assert_eq!(frame.get("ram").map(|u| u.text.as_str()), Some("RAM: 2.0%"));
        assert!(frame.get("disk").is_none());
    }
}

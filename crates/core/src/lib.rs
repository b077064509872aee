pub mod error;
pub mod sink;
pub mod state;

pub use error::{MonitorError, Result};
pub use sink::{Frame, LabelUpdate, PresentationSink};
pub use state::{
    BatteryCharge, BatteryReading, BatteryStatus, SystemSnapshot, Tier, TimeRemaining,
};

//! Turns readings into label text and urgency tiers, and the terminal sink
//! that prints them.

pub mod classify;
pub mod colors;
pub mod labels;
pub mod terminal;

pub use classify::{classify, BatteryDisplay, ClassifyOptions};
pub use colors::{tier_color, Color};
pub use labels::{frame, FrameOptions};
pub use terminal::{OutputFormat, TerminalSink};

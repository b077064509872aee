use crate::colors::tier_color;
use crossterm::style::Stylize;
use hostmon_core::{Frame, MonitorError, PresentationSink, Result};
use std::io::{self, Stdout, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A timestamp header followed by one line per label.
    #[default]
    Text,
    /// One JSON object per frame.
    Json,
}

/// Prints frames to a writer (stdout in the binary).
pub struct TerminalSink<W: Write + Send> {
    out:    W,
    format: OutputFormat,
    color:  bool,
}

impl TerminalSink<Stdout> {
    pub fn stdout(format: OutputFormat, color: bool) -> Self {
        Self::new(io::stdout(), format, color)
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W, format: OutputFormat, color: bool) -> Self {
        Self { out, format, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, frame: &Frame) -> io::Result<()> {
        writeln!(self.out, "── {} ──", frame.taken_at.format("%H:%M:%S"))?;
        for update in &frame.updates {
            match update.tier.filter(|_| self.color) {
                Some(tier) => writeln!(
                    self.out,
                    "{}",
                    update.text.as_str().with(tier_color(tier).into())
                )?,
                None => writeln!(self.out, "{}", update.text)?,
            }
        }
        Ok(())
    }

    fn write_json(&mut self, frame: &Frame) -> Result<()> {
        serde_json::to_writer(&mut self.out, frame)
            .map_err(|e| MonitorError::Sink(format!("cannot encode frame: {e}")))?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write + Send> PresentationSink for TerminalSink<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(frame)?,
            OutputFormat::Json => self.write_json(frame)?,
        }
        self.out.flush()?;
        Ok(())
    }
}

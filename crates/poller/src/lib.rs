//! The poll loop that ties collection, classification and presentation
//! together, plus the process-level `run` entry point.

pub mod poll;
pub mod shutdown;

pub use poll::{PollState, Poller};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use hostmon_display::OutputFormat;

use hostmon_config::{ConfigWatcher, MonitorConfig};
use hostmon_core::{MonitorError, Result};
use hostmon_display::TerminalSink;
use hostmon_system::{BatterySource, SysinfoCollector};
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit config file. Falls back to [`hostmon_config::default_path`].
    pub config_path: Option<PathBuf>,
    /// Overrides `poll.interval_ms` and disables live reload.
    pub interval_override: Option<u64>,
    pub format: OutputFormat,
    pub color: bool,
}

/// Load config, detect batteries and poll until SIGINT / SIGTERM.
pub async fn run(options: RunOptions) -> Result<()> {
    let path = match &options.config_path {
        Some(path) if !path.exists() => {
            return Err(MonitorError::Config(format!(
                "config file '{}' does not exist",
                path.display()
            )));
        }
        Some(path) => path.clone(),
        None => hostmon_config::default_path(),
    };

    let config = effective_config(hostmon_config::load(&path)?, options.interval_override)?;

    let batteries = BatterySource::detect(&config.battery);
    let collector = SysinfoCollector::from_config(&config);
    let sink      = TerminalSink::stdout(options.format, options.color);

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(forward_signals(trigger));

    let mut poller = Poller::new(collector, batteries, sink, &config);
    // Live reload lasts as long as this handle.
    let _watcher = if options.interval_override.is_none() {
        let (watcher, changes) = ConfigWatcher::spawn(&path);
        poller = poller.with_reload(&path, changes);
        Some(watcher)
    } else {
        None
    };

    poller.run(shutdown).await;
    Ok(())
}

fn effective_config(mut config: MonitorConfig, interval_ms: Option<u64>) -> Result<MonitorConfig> {
    if let Some(ms) = interval_ms {
        config.poll.interval_ms = ms;
    }
    hostmon_config::validate(&config)?;
    Ok(config)
}

async fn forward_signals(trigger: ShutdownTrigger) {
    match wait_for_signal().await {
        Ok(name) => {
            info!("Received {name}, shutting down");
            trigger.trigger();
        }
        Err(e) => {
            warn!("Cannot listen for termination signals: {e}");
            // Keep the trigger alive so the loop is not stopped by its drop.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl-C")
}

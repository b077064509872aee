use crate::shutdown::Shutdown;
use hostmon_config::MonitorConfig;
use hostmon_core::{Frame, PresentationSink, SystemSnapshot};
use hostmon_display::{labels, FrameOptions};
use hostmon_system::{BatterySource, MetricCollector};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Where the poll loop is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next deadline.
    Idle,
    /// Collecting metrics and batteries, then presenting the frame.
    Collecting,
}

struct Reload {
    path:    PathBuf,
    changes: mpsc::Receiver<()>,
}

/// Periodically collects host telemetry and hands one [`Frame`] per tick to
/// a [`PresentationSink`].
///
/// The next tick starts `interval` after the previous one finished, so cycles
/// drift but never overlap.
pub struct Poller<C, S> {
    collector:    Arc<Mutex<C>>,
    batteries:    BatterySource,
    sink:         S,
    options:      FrameOptions,
    interval:     Duration,
    read_timeout: Duration,
    state:        PollState,
    reload:       Option<Reload>,
}

impl<C, S> Poller<C, S>
where
    C: MetricCollector + 'static,
    S: PresentationSink,
{
    pub fn new(collector: C, batteries: BatterySource, sink: S, config: &MonitorConfig) -> Self {
        Self {
            collector:    Arc::new(Mutex::new(collector)),
            batteries,
            sink,
            options:      FrameOptions::from_config(config),
            interval:     config.poll.interval(),
            read_timeout: config.poll.read_timeout(),
            state:        PollState::Idle,
            reload:       None,
        }
    }

    /// Re-read `path` whenever `changes` fires and adopt its poll interval.
    #[must_use]
    pub fn with_reload(mut self, path: impl Into<PathBuf>, changes: mpsc::Receiver<()>) -> Self {
        self.reload = Some(Reload { path: path.into(), changes });
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `shutdown` fires, then hand the sink back.
    ///
    /// Shutdown is observed while idle; a cycle already in flight completes
    /// first.
    pub async fn run(mut self, mut shutdown: Shutdown) -> S {
        info!(
            "Poll loop started: every {:?}, {} battery device(s)",
            self.interval,
            self.batteries.devices().len()
        );

        'poll: while !shutdown.is_triggered() {
            self.tick().await;

            let cycle_end = Instant::now();
            let mut deadline = cycle_end + self.interval;

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break 'poll,
                    _ = tokio::time::sleep_until(deadline) => break,
                    change = next_change(&mut self.reload) => match change {
                        Some(()) => {
                            if self.reload_interval() {
                                deadline = cycle_end + self.interval;
                            }
                        }
                        None => self.reload = None,
                    },
                }
            }
        }

        info!("Poll loop stopped");
        self.sink
    }

    /// One full cycle: Idle → Collecting → Idle.
    pub async fn tick(&mut self) -> Frame {
        self.transition(PollState::Collecting);
        let started = Instant::now();

        let metrics  = collect_metrics(Arc::clone(&self.collector)).await;
        let readings = self.batteries.read_all(self.read_timeout).await;
        let frame    = Frame::new(labels::frame(metrics.as_ref(), &readings, &self.options));

        if let Err(e) = self.sink.present(&frame) {
            warn!("Sink rejected frame: {e}");
        }

        debug!(elapsed = ?started.elapsed(), batteries = readings.len(), "Poll cycle complete");
        self.transition(PollState::Idle);
        frame
    }

    /// Returns `true` if the interval changed.
    fn reload_interval(&mut self) -> bool {
        let Some(reload) = &self.reload else {
            return false;
        };

        match hostmon_config::load(&reload.path) {
            Ok(config) if config.poll.interval() != self.interval => {
                info!("Poll interval changed: {:?} -> {:?}", self.interval, config.poll.interval());
                self.interval = config.poll.interval();
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Config reload failed: {e}");
                false
            }
        }
    }

    fn transition(&mut self, next: PollState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// `None` when the collector panicked.
async fn collect_metrics<C: MetricCollector + 'static>(
    collector: Arc<Mutex<C>>,
) -> Option<SystemSnapshot> {
    let result = tokio::task::spawn_blocking(move || {
        let mut collector = collector.lock().unwrap_or_else(PoisonError::into_inner);
        collector.snapshot()
    })
    .await;

    match result {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("Metric collection failed: {e}");
            None
        }
    }
}

async fn next_change(reload: &mut Option<Reload>) -> Option<()> {
    match reload {
        Some(reload) => reload.changes.recv().await,
        None => std::future::pending().await,
    }
}

use notify::event::EventKind;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Signals the poll loop whenever the config file is written, created or
/// replaced.
///
/// The parent directory is watched rather than the file itself, so a config
/// created after startup or saved through an editor's rename is still seen.
/// Watching stops when the handle is dropped.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut changes) =
///     hostmon_config::ConfigWatcher::spawn("/home/user/.config/hostmon/hostmon.toml");
/// while changes.recv().await.is_some() {
///     let config = hostmon_config::load("/home/user/.config/hostmon/hostmon.toml");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Start watching `path` on the current tokio runtime.
    ///
    /// The receiver closes if the watch cannot be established or the handle
    /// is dropped.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        // One slot: a pending notification already means "reload".
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(watch_config(path.as_ref().to_path_buf(), tx));

        (Self { task }, rx)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_config(path: PathBuf, changes: mpsc::Sender<()>) {
    let (Some(dir), Some(file_name)) = (watched_dir(&path), path.file_name()) else {
        warn!("Not watching '{}': no file name", path.display());
        return;
    };
    let file_name = file_name.to_os_string();

    let (event_tx, mut events) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.send(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Cannot create config watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        warn!("Not watching '{}': {e}", dir.display());
        return;
    }
    info!("Watching config file: {}", path.display());

    while let Some(event) = events.recv().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Config watcher error: {e}");
                continue;
            }
        };
        if !touches(&event, &file_name) {
            continue;
        }

        debug!("Config event: {:?}", event.kind);
        if changes.try_send(()).is_err() && changes.is_closed() {
            break;
        }
    }
}

/// The directory holding `path`; `.` for a bare file name.
fn watched_dir(path: &Path) -> Option<PathBuf> {
    match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Some(PathBuf::from(".")),
        Some(dir) => Some(dir.to_path_buf()),
        None => None,
    }
}

/// Whether `event` writes, creates or renames the watched file.
fn touches(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

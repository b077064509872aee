use std::sync::Arc;
use tokio::sync::watch;

/// Create a linked trigger / signal pair.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(Arc::new(tx)), Shutdown(rx))
}

/// Requests a clean stop of the poll loop.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger(Arc<watch::Sender<bool>>);

impl ShutdownTrigger {
    /// Idempotent.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by the poll loop at its idle suspension point.
///
/// Dropping every [`ShutdownTrigger`] also counts as a shutdown request.
#[derive(Debug, Clone)]
pub struct Shutdown(watch::Receiver<bool>);

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once shutdown has been requested.
    pub async fn wait(&mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }
}

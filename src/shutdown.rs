use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Upper bound on waiting for in-flight connections once a termination
/// signal arrives.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Shutdown request shared between the serve loop and the signal watcher.
///
/// The token tells the serve loop to stop accepting; the tracker holds the
/// in-flight connections the drain waits on. The transition to Draining
/// happens once and is never reversed.
#[derive(Clone)]
pub struct Shutdown {
    token: CancellationToken,
    tracker: TaskTracker,
    phase: Arc<AtomicU8>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            phase: Arc::new(AtomicU8::new(Phase::Running as u8)),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn is_draining(&self) -> bool {
        self.phase() != Phase::Running
    }

    /// Number of connections still in flight.
    pub fn active(&self) -> usize {
        self.tracker.len()
    }

    /// Spawns a connection handler that the drain will wait on.
    pub fn track<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(future)
    }

    /// Resolves when shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }

    /// Stops the serve loop and waits for in-flight connections, bounded by
    /// `timeout`. Returns false if the bound expired with work still
    /// active.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.phase.store(Phase::Draining as u8, Ordering::SeqCst);
        self.token.cancel();
        self.tracker.close();

        let finished = tokio::select! {
            _ = self.tracker.wait() => true,
            _ = tokio::time::sleep(timeout) => false,
        };

        self.phase.store(Phase::Stopped as u8, Ordering::SeqCst);
        finished
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Background watcher: waits for SIGINT or SIGTERM, drains the server, and
/// signals `done` exactly once so main exits only after shutdown
/// bookkeeping finishes.
pub async fn watch(shutdown: Shutdown, done: oneshot::Sender<()>) {
    wait_for_signal().await;

    log::info!("Shutting down gracefully.");
    finish(shutdown, done, DRAIN_TIMEOUT).await;
}

async fn finish(shutdown: Shutdown, done: oneshot::Sender<()>, timeout: Duration) {
    if !shutdown.drain(timeout).await {
        // Not fatal: the remaining connections are cut when the process
        // exits.
        log::warn!(
            "Server forced to shutdown with {} connections still active",
            shutdown.active()
        );
    }

    log::info!("Server exiting");
    let _ = done.send(());
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                log::error!("error installing SIGTERM handler: {e}");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_waits_for_in_flight_work() {
        let shutdown = Shutdown::new();

        shutdown.track(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        });

        assert_eq!(shutdown.phase(), Phase::Running);

        let finished = shutdown.drain(Duration::from_secs(1)).await;

        assert!(finished);
        assert_eq!(shutdown.phase(), Phase::Stopped);
        assert_eq!(shutdown.active(), 0);
    }

    #[tokio::test]
    async fn drain_gives_up_after_the_bound() {
        let shutdown = Shutdown::new();

        shutdown.track(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let finished = shutdown.drain(Duration::from_millis(50)).await;

        assert!(!finished);
        assert_eq!(shutdown.phase(), Phase::Stopped);
        assert_eq!(shutdown.active(), 1);
    }

    #[tokio::test]
    async fn drain_requests_shutdown_before_waiting() {
        let shutdown = Shutdown::new();
        let observer = shutdown.clone();

        let waiter = tokio::spawn(async move {
            observer.requested().await;
        });

        shutdown.drain(Duration::from_millis(50)).await;
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn finish_signals_done_exactly_once_when_graceful() {
        let shutdown = Shutdown::new();
        shutdown.track(async {});

        let (done_tx, done_rx) = oneshot::channel();
        finish(shutdown, done_tx, Duration::from_secs(1)).await;

        assert!(done_rx.await.is_ok());
    }

    #[tokio::test]
    async fn finish_signals_done_even_when_forced() {
        let shutdown = Shutdown::new();
        shutdown.track(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let (done_tx, done_rx) = oneshot::channel();
        finish(shutdown, done_tx, Duration::from_millis(20)).await;

        assert!(done_rx.await.is_ok());
    }
}

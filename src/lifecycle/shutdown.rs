//! Graceful Shutdown Handler
//!
//! Watches for OS termination signals (SIGINT, SIGTERM) and programmatic
//! shutdown requests, and turns either into cancellation of the running
//! scope.

use super::error::{AppResult, LifecycleError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Programmatic trigger equivalent to receiving SIGTERM
///
/// # Example
///
/// ```rust
/// use runkit::lifecycle::ShutdownHandle;
///
/// let handle = ShutdownHandle::new();
/// let remote = handle.clone();
/// remote.trigger();
/// assert!(handle.is_triggered());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown has been requested
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}

/// Signal watcher task
///
/// Returns `Ok` after a signal or a trigger, marking `signalled`, and
/// `Err(Cancelled)` when `token` is cancelled first.
pub struct SignalWatcher {
    handle: ShutdownHandle,
    signalled: Arc<AtomicBool>,
}

impl SignalWatcher {
    pub fn new(handle: ShutdownHandle) -> Self {
        Self {
            handle,
            signalled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once a shutdown was requested from outside the application
    pub fn signalled(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.signalled)
    }

    pub async fn watch(self, token: CancellationToken) -> AppResult {
        let ctrl_c = async { signal::ctrl_c().await.map(|()| "SIGINT") };

        #[cfg(unix)]
        let terminate = async {
            let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            stream.recv().await;
            Ok::<_, std::io::Error>("SIGTERM")
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<std::io::Result<&'static str>>();

        let source = tokio::select! {
            _ = token.cancelled() => return Err(LifecycleError::Cancelled.into()),
            received = ctrl_c => received.map_err(LifecycleError::Signal)?,
            received = terminate => received.map_err(LifecycleError::Signal)?,
            _ = self.handle.triggered() => "shutdown handle",
        };

        tracing::info!(source, "Signal received, terminating...");
        self.signalled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_marks_signalled() {
        let handle = ShutdownHandle::new();
        let watcher = SignalWatcher::new(handle.clone());
        let signalled = watcher.signalled();

        let task = tokio::spawn(watcher.watch(CancellationToken::new()));
        handle.trigger();

        assert!(task.await.unwrap().is_ok());
        assert!(signalled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancellation_is_not_a_signal() {
        let watcher = SignalWatcher::new(ShutdownHandle::new());
        let signalled = watcher.signalled();
        let token = CancellationToken::new();
        token.cancel();

        let err = watcher.watch(token).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::Cancelled)
        ));
        assert!(!signalled.load(Ordering::SeqCst));
    }
}

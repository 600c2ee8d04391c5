//! Real OS signals, kept in their own test binary so no other test sees them

#![cfg(unix)]

use runkit::lifecycle::SignalWatcher;
use runkit::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

#[derive(Default, Configurable)]
struct ServerConfig {
    #[config(description = "Address to listen on")]
    listen: String,
}

/// Raise `signo` until the caller stops polling
///
/// The watcher registers its handler asynchronously, so a single raise may
/// land before it listens.
async fn keep_raising(signo: libc::c_int) {
    loop {
        // SAFETY: raise only delivers a signal to the calling process
        unsafe {
            libc::raise(signo);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn serve(ctx: RunContext, _config: ServerConfig) -> AppResult {
    ctx.cancelled().await;
    Err(LifecycleError::Cancelled.into())
}

#[tokio::test]
async fn test_sigterm_stops_service_cleanly() {
    // Keep the default action from terminating the test process.
    let _handler = signal(SignalKind::terminate()).unwrap();

    let run = Runner::service("sigterm-server")
        .without_logger()
        .with_env(HashMap::<String, String>::new())
        .run(ServerConfig::default(), Vec::<String>::new(), serve);

    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::select! {
            outcome = run => outcome,
            _ = keep_raising(libc::SIGTERM) => unreachable!(),
        }
    })
    .await
    .unwrap();

    assert!(matches!(outcome, Outcome::CancelledBySignal));
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_sigint_marks_watcher_signalled() {
    let _handler = signal(SignalKind::interrupt()).unwrap();

    let watcher = SignalWatcher::new(ShutdownHandle::new());
    let signalled = watcher.signalled();
    let watch = watcher.watch(CancellationToken::new());

    let result = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::select! {
            result = watch => result,
            _ = keep_raising(libc::SIGINT) => unreachable!(),
        }
    })
    .await
    .unwrap();

    assert!(result.is_ok());
    assert!(signalled.load(Ordering::SeqCst));
}

use runkit::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Default, Configurable)]
struct WorkerConfig {
    #[config(description = "Items to process before stopping")]
    batch_size: i64,
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_tool_receives_resolved_config() {
    let seen = Arc::new(AtomicI64::new(0));
    let sink = seen.clone();

    let outcome = Runner::tool("/usr/local/bin/worker")
        .without_logger()
        .with_env(env(&[("WORKER_BATCH_SIZE", "40")]))
        .flavour(LoggingFlavour)
        .run(WorkerConfig::default(), Vec::<String>::new(), move |ctx, config| async move {
            assert_eq!(ctx.app_name().as_str(), "worker");
            sink.store(config.batch_size, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(seen.load(Ordering::SeqCst), 40);
}

async fn drain(ctx: RunContext, config: WorkerConfig, shutdown: ShutdownHandle) -> AppResult {
    for _ in 0..config.batch_size {
        ctx.check()?;
        tokio::task::yield_now().await;
    }
    shutdown.trigger();
    ctx.cancelled().await;
    Err(LifecycleError::Cancelled.into())
}

#[tokio::test]
async fn test_service_winds_down_on_shutdown() {
    let runner = Runner::service("worker")
        .without_logger()
        .with_env(env(&[]))
        .flavour(LoggingFlavour);
    let shutdown = runner.shutdown_handle();

    let outcome = runner
        .run(WorkerConfig::default(), ["--batch-size", "2"], move |ctx, config| {
            drain(ctx, config, shutdown)
        })
        .await;

    assert!(matches!(outcome, Outcome::CancelledBySignal));
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_help_outcome() {
    let outcome = Runner::tool("worker")
        .without_logger()
        .with_env(env(&[]))
        .run(WorkerConfig::default(), ["--help"], |_, _| async { Ok(()) })
        .await;

    assert!(matches!(outcome, Outcome::HelpRequested));
    assert_eq!(outcome.exit_code(), 2);
}

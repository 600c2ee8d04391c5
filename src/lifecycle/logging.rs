use super::context::RunContext;
use super::error::{AppResult, is_cancellation};
use super::flavour::{Flavour, Next};
use async_trait::async_trait;
use std::time::Instant;

/// A flavour that logs start, completion and timing of the body
#[derive(Clone, Default)]
pub struct LoggingFlavour;

#[async_trait]
impl Flavour for LoggingFlavour {
    async fn wrap(&self, ctx: RunContext, next: Next) -> AppResult {
        let app = ctx.app_name().clone();
        let start = Instant::now();

        tracing::info!(app = %app, "Starting");

        let result = next.run(ctx).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(app = %app, ?elapsed, "Finished"),
            Err(e) if is_cancellation(e) => tracing::info!(app = %app, ?elapsed, "Cancelled"),
            Err(e) => tracing::warn!(app = %app, ?elapsed, error = %e, "Finished with error"),
        }
        result
    }
}

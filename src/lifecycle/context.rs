//! Run context handed to application bodies

use super::error::LifecycleError;
use crate::app::AppName;
use tokio_util::sync::CancellationToken;

/// Cancellable execution context of one application run
///
/// Cloning is cheap; all clones observe the same cancellation.
#[derive(Debug, Clone)]
pub struct RunContext {
    app: AppName,
    token: CancellationToken,
}

impl RunContext {
    pub fn new(app: AppName, token: CancellationToken) -> Self {
        Self { app, token }
    }

    pub fn app_name(&self) -> &AppName {
        &self.app
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Completes once shutdown has begun
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Err(Cancelled)` once shutdown has begun
    ///
    /// ```
    /// # use runkit::{AppName, RunContext};
    /// # use tokio_util::sync::CancellationToken;
    /// let ctx = RunContext::new(AppName::new("x"), CancellationToken::new());
    /// assert!(ctx.check().is_ok());
    /// ctx.token().cancel();
    /// assert!(ctx.check().is_err());
    /// ```
    pub fn check(&self) -> Result<(), LifecycleError> {
        if self.is_cancelled() {
            Err(LifecycleError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Context cancelled together with this one, but cancellable on its own
    pub fn child(&self) -> Self {
        Self {
            app: self.app.clone(),
            token: self.token.child_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_child_follows_parent() {
        let ctx = RunContext::new(AppName::new("app"), CancellationToken::new());
        let child = ctx.child();

        child.token().cancel();
        assert!(child.is_cancelled());
        assert!(!ctx.is_cancelled());

        let other = ctx.child();
        ctx.token().cancel();
        other.cancelled().await;
        assert!(matches!(other.check(), Err(LifecycleError::Cancelled)));
    }
}

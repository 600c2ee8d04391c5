//! Flavour chain
//!
//! Flavours wrap the application body the way middleware wraps a handler:
//! each receives the run context and a [`Next`] continuation, may act before
//! and after calling it, and may replace its result.

use super::context::RunContext;
use super::error::AppResult;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a continuation
pub type BoxFuture = Pin<Box<dyn Future<Output = AppResult> + Send>>;

/// The remainder of the chain, ending in the application body
pub struct Next {
    run: Box<dyn FnOnce(RunContext) -> BoxFuture + Send>,
}

impl Next {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(RunContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult> + Send + 'static,
    {
        Self {
            run: Box::new(move |ctx| Box::pin(f(ctx))),
        }
    }

    /// Execute the rest of the chain
    pub async fn run(self, ctx: RunContext) -> AppResult {
        (self.run)(ctx).await
    }
}

/// A wrapper around the application body
///
/// # Example
/// ```
/// use runkit::lifecycle::{AppResult, Flavour, Next, RunContext};
/// use async_trait::async_trait;
///
/// struct Announce;
///
/// #[async_trait]
/// impl Flavour for Announce {
///     async fn wrap(&self, ctx: RunContext, next: Next) -> AppResult {
///         tracing::info!("before");
///         let result = next.run(ctx).await;
///         tracing::info!("after");
///         result
///     }
/// }
/// ```
#[async_trait]
pub trait Flavour: Send + Sync + 'static {
    async fn wrap(&self, ctx: RunContext, next: Next) -> AppResult;
}

/// Wrap `body` in `flavours`; `flavours[0]` ends up outermost
pub fn compose(flavours: &[Arc<dyn Flavour>], body: Next) -> Next {
    flavours.iter().rev().fold(body, |next, flavour| {
        let flavour = Arc::clone(flavour);
        Next::new(move |ctx| async move { flavour.wrap(ctx, next).await })
    })
}

/// Insertion-ordered list of flavours
#[derive(Clone, Default)]
pub struct FlavourChain {
    flavours: Vec<Arc<dyn Flavour>>,
}

impl FlavourChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flavour: impl Flavour) {
        self.flavours.push(Arc::new(flavour));
    }

    pub fn len(&self) -> usize {
        self.flavours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flavours.is_empty()
    }

    pub fn compose(&self, body: Next) -> Next {
        compose(&self.flavours, body)
    }
}

/// Flavour built from a closure
pub struct FnFlavour<F>(F);

/// Adapt a closure into a [`Flavour`]
///
/// ```
/// use runkit::lifecycle::flavour_fn;
///
/// let timed = flavour_fn(|ctx, next| async move {
///     let start = std::time::Instant::now();
///     let result = next.run(ctx).await;
///     tracing::debug!(elapsed = ?start.elapsed(), "Body finished");
///     result
/// });
/// ```
pub fn flavour_fn<F, Fut>(f: F) -> FnFlavour<F>
where
    F: Fn(RunContext, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult> + Send + 'static,
{
    FnFlavour(f)
}

#[async_trait]
impl<F, Fut> Flavour for FnFlavour<F>
where
    F: Fn(RunContext, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult> + Send + 'static,
{
    async fn wrap(&self, ctx: RunContext, next: Next) -> AppResult {
        (self.0)(ctx, next).await
    }
}

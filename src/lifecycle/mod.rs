//! Lifecycle Module
//!
//! Runs an application body under supervision and turns its fate into a
//! process exit code.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Configuration Resolution          file → env → flags
//!    ↓
//! 2. Logger Installation
//!    ↓
//! 3. Task Scope                        body task + signal task
//!    ↓
//! [Running...]
//!    ↓
//! 4. Shutdown Signal (SIGTERM/SIGINT)  or ShutdownHandle::trigger
//!    ↓
//! 5. Scope Cancellation                body observes RunContext::cancelled
//!    ↓
//! 6. Exit Classification               0 / 1 / 2
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use runkit::lifecycle::Runner;
//!
//! Runner::tool("reindex").execute((), |ctx, ()| async move {
//!     for shard in 0..16 {
//!         ctx.check()?;
//!         tracing::info!(shard, "Reindexing shard");
//!     }
//!     Ok::<_, anyhow::Error>(())
//! })
//! ```

mod context;
mod error;
mod flavour;
mod logging;
mod outcome;
mod runner;
mod scope;
mod shutdown;

pub use context::RunContext;
pub use error::{AppResult, LifecycleError, Result, is_cancellation};
pub use flavour::{BoxFuture, Flavour, FlavourChain, FnFlavour, Next, compose, flavour_fn};
pub use logging::LoggingFlavour;
pub use outcome::Outcome;
pub use runner::{Mode, Runner, service, tool};
pub use scope::{OnExit, TaskScope};
pub use shutdown::{ShutdownHandle, SignalWatcher};

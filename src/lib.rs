//! # runkit
//!
//! Application bootstrap for command-line tools and long-running services.
//!
//! runkit does two things before and around your `main` logic:
//!
//! - **Configuration**: a `#[derive(Configurable)]` struct is filled from a
//!   configuration file, environment variables and command-line flags, in
//!   that order of increasing precedence.
//! - **Supervision**: the application body runs next to a signal watcher in
//!   one task scope. SIGINT/SIGTERM cancel the body, failures are logged and
//!   every path ends with a flushed logger and a meaningful exit code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runkit::prelude::*;
//!
//! #[derive(Default, Configurable)]
//! struct Config {
//!     #[config(description = "Address to listen on")]
//!     listen_address: String,
//!
//!     #[config(description = "Number of retries for upstream calls")]
//!     max_retry_count: i64,
//!
//!     #[config(description = "Upstream servers")]
//!     upstreams: Vec<String>,
//! }
//!
//! fn main() {
//!     let defaults = Config {
//!         listen_address: "0.0.0.0:8080".into(),
//!         max_retry_count: 3,
//!         ..Config::default()
//!     };
//!
//!     // edge-proxy --listen-address=:9090 --upstreams=a:80,b:80
//!     // EDGE_PROXY_MAX_RETRY_COUNT=5 edge-proxy
//!     // edge-proxy --config=edge.json    with {"edge-proxy": {"upstreams": ["a:80"]}}
//!     Runner::service("edge-proxy")
//!         .flavour(LoggingFlavour)
//!         .execute(defaults, |ctx, config| async move {
//!             tracing::info!(listen = %config.listen_address, "Serving");
//!             ctx.cancelled().await;
//!             Ok(())
//!         })
//! }
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | `0`  | Finished, or stopped by a shutdown signal       |
//! | `1`  | Configuration error, body error or panic        |
//! | `2`  | `-h` / `--help`                                 |

extern crate self as runkit;

pub mod app;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;

// Re-export core types
pub use app::AppName;
pub use config::{ConfigError, ConfigResolver, Configurable, resolve_config};
pub use error::{Error, Result};
pub use lifecycle::{
    Flavour, LifecycleError, LoggingFlavour, Mode, Next, Outcome, RunContext, Runner,
    ShutdownHandle,
};
pub use logging::{LogConfig, Logger};

// Re-export macros
pub use runkit_macro::Configurable;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use runkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::AppName;
    pub use crate::Configurable;
    pub use crate::config::{ConfigError, ConfigResolver, resolve_config};
    pub use crate::lifecycle::{
        AppResult, Flavour, FlavourChain, LifecycleError, LoggingFlavour, Mode, Next, OnExit,
        Outcome, RunContext, Runner, ShutdownHandle, TaskScope, flavour_fn,
    };
    pub use crate::logging::{LogConfig, Logger};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}

//! Supervised lifecycle runner
//!
//! ```text
//! 1. Resolve configuration     application config + logger config
//!    ↓
//! 2. Install logger
//!    ↓
//! 3. Supervise                 body task (flavour-wrapped) + signal task
//!    ↓
//! [Running...]
//!    ↓
//! 4. Classify                  Clean / CancelledBySignal / HelpRequested / Failure
//!    ↓
//! 5. Flush logger, exit        0 / 0 / 2 / 1
//! ```

use super::context::RunContext;
use super::error::AppResult;
use super::flavour::{Flavour, FlavourChain, Next};
use super::outcome::Outcome;
use super::scope::{OnExit, TaskScope};
use super::shutdown::{ShutdownHandle, SignalWatcher};
use crate::app::AppName;
use crate::config::{ConfigError, ConfigResolver, Configurable, EnvSource};
use crate::logging::{LogConfig, Logger, LoggerError};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

const SIGNALS_TASK: &str = "signals";
const MAIN_TASK: &str = "main";

/// Kind of application being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Runs until told to stop; returning on its own is a failure
    Service,
    /// Runs to completion
    Tool,
}

impl Mode {
    fn on_exit(self) -> OnExit {
        match self {
            Mode::Service => OnExit::Fail,
            Mode::Tool => OnExit::Exit,
        }
    }

    fn log_defaults(self) -> LogConfig {
        match self {
            Mode::Service => LogConfig::service(),
            Mode::Tool => LogConfig::tool(),
        }
    }
}

/// Runs an application body under supervision
///
/// # Example
///
/// ```no_run
/// use runkit::{Configurable, Runner};
///
/// #[derive(Default, Configurable)]
/// struct Config {
///     #[config(description = "Address to listen on")]
///     listen: String,
/// }
///
/// fn main() {
///     Runner::service("echo-server").execute(Config::default(), |ctx, config| async move {
///         tracing::info!(listen = %config.listen, "Listening");
///         ctx.cancelled().await;
///         Ok(())
///     })
/// }
/// ```
pub struct Runner {
    app: AppName,
    mode: Mode,
    flavours: FlavourChain,
    env: Option<Arc<dyn EnvSource>>,
    logger: bool,
    shutdown: ShutdownHandle,
}

impl Runner {
    pub fn new(app: AppName, mode: Mode) -> Self {
        Self {
            app,
            mode,
            flavours: FlavourChain::new(),
            env: None,
            logger: true,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Long-running service named after the base name of `name`
    pub fn service(name: impl AsRef<Path>) -> Self {
        Self::new(AppName::from_path(name), Mode::Service)
    }

    /// Run-to-completion tool named after the base name of `name`
    pub fn tool(name: impl AsRef<Path>) -> Self {
        Self::new(AppName::from_path(name), Mode::Tool)
    }

    /// Named after the running binary, as invoked
    pub fn current(mode: Mode) -> Self {
        Self::new(AppName::current(), mode)
    }

    /// Wrap the body in `flavour`; earlier flavours wrap later ones
    pub fn flavour(mut self, flavour: impl Flavour) -> Self {
        self.flavours.push(flavour);
        self
    }

    /// Resolve configuration against `env` instead of the process environment
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    /// Leave logging to the embedding application
    ///
    /// The `--log-level` and `--log-format` flags are not registered.
    pub fn without_logger(mut self) -> Self {
        self.logger = false;
        self
    }

    /// Handle that requests shutdown as if SIGTERM had been received
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn app_name(&self) -> &AppName {
        &self.app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Build a tokio runtime, run the application with the process
    /// arguments and exit with its code
    pub fn execute<C, F, Fut>(self, config: C, body: F) -> !
    where
        C: Configurable,
        F: FnOnce(RunContext, C) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult> + Send + 'static,
    {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        let runtime = match self.mode {
            Mode::Service => tokio::runtime::Builder::new_multi_thread()
                .worker_threads(num_cpus::get())
                .enable_all()
                .build(),
            Mode::Tool => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build(),
        };

        let outcome = match runtime {
            Ok(runtime) => runtime.block_on(self.run(config, args, body)),
            Err(e) => {
                eprintln!("{}: failed to start runtime: {e}", self.app);
                Outcome::Failure(e.into())
            }
        };
        outcome.exit()
    }

    /// Resolve configuration, run `body` under supervision and classify the
    /// result
    ///
    /// `args` excludes the program name. Help text is printed to stdout and
    /// configuration errors to stderr; the body never runs in either case.
    pub async fn run<C, I, S, F, Fut>(self, mut config: C, args: I, body: F) -> Outcome
    where
        C: Configurable,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(RunContext, C) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult> + Send + 'static,
    {
        let logger = match self.prepare(&mut config, args) {
            Ok(logger) => logger,
            Err(err) => return self.startup_failure(err),
        };

        let outcome = self.supervise(config, body).await;
        if let Outcome::Failure(e) = &outcome {
            tracing::error!(app = %self.app, error = %format!("{e:#}"), "Application returned error");
        }

        drop(logger);
        outcome
    }

    fn resolve<C, I, S>(&self, config: &mut C, log_config: &mut LogConfig, args: I) -> Result<(), ConfigError>
    where
        C: Configurable,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolver = ConfigResolver::new(&self.app).section(config);
        if let Some(env) = &self.env {
            resolver = resolver.with_env(Arc::clone(env));
        }
        if self.logger {
            resolver = resolver.section(log_config);
        }
        resolver.resolve(args)
    }

    /// Resolve configuration and install the logger
    fn prepare<C, I, S>(&self, config: &mut C, args: I) -> crate::Result<Option<Logger>>
    where
        C: Configurable,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log_config = self.mode.log_defaults();
        self.resolve(config, &mut log_config, args)?;
        Ok(self.install_logger(&log_config)?)
    }

    fn startup_failure(&self, err: crate::Error) -> Outcome {
        match err {
            crate::Error::Config(ConfigError::HelpRequested { help }) => {
                println!("{help}");
                Outcome::HelpRequested
            }
            err => {
                eprintln!("{}: {err}", self.app);
                Outcome::Failure(err.into())
            }
        }
    }

    fn install_logger(&self, log_config: &LogConfig) -> Result<Option<Logger>, LoggerError> {
        if !self.logger {
            return Ok(None);
        }
        match Logger::init(&self.app, log_config) {
            Ok(logger) => Ok(Some(logger)),
            Err(LoggerError::Subscriber(e)) => {
                tracing::debug!(error = %e, "Global subscriber already installed, keeping it");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn supervise<C, F, Fut>(&self, config: C, body: F) -> Outcome
    where
        C: Configurable,
        F: FnOnce(RunContext, C) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult> + Send + 'static,
    {
        let root = CancellationToken::new();
        let watcher = SignalWatcher::new(self.shutdown.clone());
        let signalled = watcher.signalled();

        let span = if self.app.is_named() {
            tracing::info_span!("app", name = %self.app)
        } else {
            tracing::Span::none()
        };
        let body_task = if self.app.is_named() {
            self.app.as_str()
        } else {
            MAIN_TASK
        };

        let result = async {
            let app = self.app.clone();
            let chain = self
                .flavours
                .compose(Next::new(move |ctx| body(ctx, config)));

            let mut scope = TaskScope::new(&root);
            scope.spawn(body_task, self.mode.on_exit(), move |token| {
                chain.run(RunContext::new(app, token))
            });
            scope.spawn(SIGNALS_TASK, OnExit::Exit, move |token| watcher.watch(token));
            scope.wait().await
        }
        .instrument(span)
        .await;

        Outcome::classify(result, signalled.load(Ordering::SeqCst))
    }
}

/// Run a long-running service and exit with its code
pub fn service<C, F, Fut>(name: impl AsRef<Path>, config: C, body: F) -> !
where
    C: Configurable,
    F: FnOnce(RunContext, C) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult> + Send + 'static,
{
    Runner::service(name).execute(config, body)
}

/// Run a tool to completion and exit with its code
pub fn tool<C, F, Fut>(name: impl AsRef<Path>, config: C, body: F) -> !
where
    C: Configurable,
    F: FnOnce(RunContext, C) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult> + Send + 'static,
{
    Runner::tool(name).execute(config, body)
}

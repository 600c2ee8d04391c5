//! # Logger
//!
//! Structured logging for tools and services. The logger is configured
//! through [`LogConfig`], which is resolved alongside the application's own
//! configuration, so `--log-level` / `<APP>_LOG_LEVEL` work like any other
//! flag.
//!
//! Records are written to stderr through a non-blocking worker. The returned
//! [`Logger`] handle owns the worker guard; dropping it flushes every pending
//! record.
//!
//! ## Example
//!
//! ```rust
//! use runkit::AppName;
//! use runkit::logging::{LogConfig, Logger};
//!
//! let _logger = Logger::init(&AppName::new("my-app"), &LogConfig::tool());
//! tracing::info!("hello");
//! ```

mod error;

pub use error::LoggerError;

use crate::app::AppName;
use crate::config::{Configurable, Schema};
use std::io::IsTerminal;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_LEVEL: &str = "info";

/// Record format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Compact human-readable lines
    Console,
    /// One JSON object per record
    Json,
}

/// Logger settings, resolved like any other configuration section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level or filter directive, e.g. `debug` or `info,hyper=warn`
    pub log_level: String,
    pub log_format: String,
}

impl LogConfig {
    /// JSON records at `info`
    pub fn service() -> Self {
        Self {
            log_level: DEFAULT_LEVEL.to_owned(),
            log_format: LogFormat::Json.to_string(),
        }
    }

    /// Console records at `info`
    pub fn tool() -> Self {
        Self {
            log_level: DEFAULT_LEVEL.to_owned(),
            log_format: LogFormat::Console.to_string(),
        }
    }

    pub fn format(&self) -> Result<LogFormat, LoggerError> {
        LogFormat::from_str(self.log_format.trim()).map_err(|_| {
            LoggerError::invalid(format!(
                "unknown log format '{}', expected console or json",
                self.log_format
            ))
        })
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let directive = match self.log_level.trim() {
            "" => DEFAULT_LEVEL,
            level => level,
        };
        EnvFilter::builder()
            .parse(directive)
            .map_err(|e| LoggerError::invalid(format!("invalid log level '{directive}': {e}")))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::tool()
    }
}

impl Configurable for LogConfig {
    fn describe(schema: &mut Schema<Self>) {
        schema
            .string(
                "LogLevel",
                "Minimum log level or filter directive",
                |c| &mut c.log_level,
            )
            .string("LogFormat", "Log record format: console or json", |c| {
                &mut c.log_format
            });
    }
}

/// Handle to the installed logger
///
/// Dropping it flushes pending records, so keep it alive until the
/// application has finished logging.
#[must_use = "Dropping this handle flushes and stops the log worker."]
#[derive(Debug)]
pub struct Logger {
    _guard: WorkerGuard,
}

impl Logger {
    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for an unknown format or
    /// level, and [`LoggerError::Subscriber`] if a global subscriber has
    /// already been installed.
    pub fn init(app: &AppName, config: &LogConfig) -> Result<Self, LoggerError> {
        let format = config.format()?;
        let filter = config.filter()?;

        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
            LogFormat::Console => fmt::layer()
                .compact()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(writer)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()?;

        tracing::debug!(app = %app, format = %format, level = %config.log_level, "Logger initialized");

        Ok(Self { _guard: guard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigResolver;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        assert_eq!(LogConfig::service().format().unwrap(), LogFormat::Json);
        assert_eq!(LogConfig::tool().format().unwrap(), LogFormat::Console);
        assert_eq!(LogConfig::default(), LogConfig::tool());
    }

    #[test]
    fn test_format_parsing() {
        let config = LogConfig {
            log_format: "JSON".into(),
            ..LogConfig::tool()
        };
        assert_eq!(config.format().unwrap(), LogFormat::Json);

        let config = LogConfig {
            log_format: "xml".into(),
            ..LogConfig::tool()
        };
        assert!(matches!(
            config.format(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_invalid_format_rejected_before_install() {
        let config = LogConfig {
            log_format: "xml".into(),
            ..LogConfig::tool()
        };
        let err = Logger::init(&AppName::new("test"), &config).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_second_init_fails() {
        let app = AppName::new("test");
        let _first = Logger::init(&app, &LogConfig::tool());
        let second = Logger::init(&app, &LogConfig::tool());
        assert!(matches!(second, Err(LoggerError::Subscriber(_))));
    }

    #[test]
    fn test_resolved_as_section() {
        let app = AppName::new("svc");
        let env: HashMap<String, String> =
            HashMap::from([("SVC_LOG_LEVEL".to_owned(), "debug".to_owned())]);
        let mut config = LogConfig::service();

        ConfigResolver::new(&app)
            .with_env(env)
            .section(&mut config)
            .resolve(["--log-format=console"])
            .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format().unwrap(), LogFormat::Console);
    }
}

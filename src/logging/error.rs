//! Logger errors

use std::borrow::Cow;
use thiserror::Error;

/// Errors that can occur during logger initialization
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The log level or format could not be understood
    #[error("Invalid logger configuration: {message}")]
    InvalidConfiguration { message: Cow<'static, str> },

    /// A global tracing subscriber is already installed in this process
    #[error("Tracing subscriber error: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

impl LoggerError {
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

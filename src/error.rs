use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::logging::LoggerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Logger(#[from] LoggerError),
}

impl Error {
    /// Whether this is a help request rather than a failure
    pub fn is_help(&self) -> bool {
        matches!(self, Error::Config(err) if err.is_help())
    }
}

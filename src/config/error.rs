//! Configuration resolution errors

use super::FieldKind;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed decoder error, either JSON or TOML
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or is not a valid document
    #[error("Failed to load config file {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// A value in the configuration file has the wrong type for its field
    #[error("Config file {}: field '{field}' must be of kind {expected}", path.display())]
    FieldType {
        path: PathBuf,
        field: String,
        expected: FieldKind,
    },

    /// A field was registered without a description
    #[error("Field {field} has no description")]
    MissingDescription { field: String },

    /// A field cannot be exposed as a flag
    #[error("Field {field} is not supported: {reason}")]
    UnsupportedField { field: String, reason: String },

    /// Two fields map onto the same flag name
    #[error("Flag --{flag} is defined more than once")]
    DuplicateFlag { flag: String },

    /// An environment variable holds a value that cannot be parsed
    #[error("Environment variable {var}={value:?} is invalid: {reason}")]
    InvalidEnvValue {
        var: String,
        value: String,
        reason: String,
    },

    /// Unknown flag or malformed value on the command line
    #[error(transparent)]
    FlagParse(#[from] clap::Error),

    /// `-h` / `--help` was given; carries the rendered help text
    #[error("Help requested")]
    HelpRequested { help: String },
}

impl ConfigError {
    /// Create an unsupported field error
    pub fn unsupported(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a config file error from any decoder or I/O error
    pub fn config_file(path: impl Into<PathBuf>, source: impl Into<DecodeError>) -> Self {
        Self::ConfigFile {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether this is the distinguished help outcome rather than a failure
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested { .. })
    }
}

/// A specialized Result type for configuration resolution
pub type Result<T> = std::result::Result<T, ConfigError>;

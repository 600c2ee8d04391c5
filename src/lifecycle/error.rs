//! Lifecycle-specific error types

use thiserror::Error;

/// Errors raised by the supervision machinery itself
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The surrounding scope was cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// A task whose completion is unexpected returned without error
    #[error("Task {name} exited unexpectedly")]
    TaskExited {
        /// Name of the task that exited
        name: String,
    },

    /// A task panicked
    #[error("Task {name} panicked: {message}")]
    TaskPanicked {
        /// Name of the task that panicked
        name: String,
        /// Panic payload, when it was a string
        message: String,
    },

    /// Signal handlers could not be installed
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

impl LifecycleError {
    /// Create an unexpected exit error
    pub fn task_exited(name: impl Into<String>) -> Self {
        Self::TaskExited { name: name.into() }
    }

    /// Create a panic error
    pub fn task_panicked(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskPanicked {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Whether `err` is, or was caused by, a cancellation
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::Cancelled)
        )
    })
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Result of an application body or flavour
pub type AppResult = anyhow::Result<()>;

//! Exit classification

use super::error::{AppResult, is_cancellation};
use std::fmt;

/// Terminal result of an application run
#[derive(Debug)]
pub enum Outcome {
    /// The body finished on its own
    Clean,
    /// Shutdown was requested from outside and the body wound down
    CancelledBySignal,
    /// Help text was requested and printed
    HelpRequested,
    /// Anything else
    Failure(anyhow::Error),
}

impl Outcome {
    /// Classify the result of a supervised scope
    ///
    /// A cancellation error counts as a clean stop only when shutdown was
    /// requested from outside the application.
    pub fn classify(result: AppResult, signalled: bool) -> Self {
        match result {
            Ok(()) if signalled => Outcome::CancelledBySignal,
            Ok(()) => Outcome::Clean,
            Err(e) if signalled && is_cancellation(&e) => Outcome::CancelledBySignal,
            Err(e) => Outcome::Failure(e),
        }
    }

    /// Process exit code: `0` clean or signal shutdown, `2` help, `1` otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Clean | Outcome::CancelledBySignal => 0,
            Outcome::HelpRequested => 2,
            Outcome::Failure(_) => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }

    /// Terminate the process with [`Outcome::exit_code`]
    pub fn exit(self) -> ! {
        std::process::exit(self.exit_code())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Clean => f.write_str("clean"),
            Outcome::CancelledBySignal => f.write_str("cancelled by signal"),
            Outcome::HelpRequested => f.write_str("help requested"),
            Outcome::Failure(e) => write!(f, "failure: {e:#}"),
        }
    }
}

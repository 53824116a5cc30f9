//! Error types for gcal.

use std::path::PathBuf;

use thiserror::Error;

/// Exit status for usage mistakes (unknown command, missing argument).
/// Matches what clap uses for its own parse errors.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Exit status for every other failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Errors that can occur while authenticating or running a command.
#[derive(Error, Debug)]
pub enum GcalError {
    #[error("No stored credential at {0}")]
    CredentialNotFound(PathBuf),

    #[error("Stored credential at {path} is unusable: {reason}")]
    CorruptCredential { path: PathBuf, reason: String },

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Failed to persist credential to {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Remote operation failed: {0}")]
    RemoteOperationFailed(String),
}

impl GcalError {
    /// Whether a fresh authorization can recover from this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GcalError::CredentialNotFound(_) | GcalError::CorruptCredential { .. }
        )
    }

    /// Usage errors are the operator's typing mistakes, not runtime failures.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            GcalError::UnknownCommand(_) | GcalError::MissingArgument(_)
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            USAGE_EXIT_CODE
        } else {
            FAILURE_EXIT_CODE
        }
    }
}

/// Result type alias for gcal operations.
pub type GcalResult<T> = Result<T, GcalError>;

/// Failure reported by an external collaborator (token endpoint, calendar API).
/// Carries the collaborator's own diagnostic text verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        RemoteError(message.into())
    }
}

//! CLI-specific error types and exit code mapping.

use ddi_core::{PathError, ProfileError};
use ddi_runtime::{InterpreterError, SessionError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error (roots, profile, `.env`).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process could not be started or supervised.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    ///
    /// A child that ran reports its own code instead; see the `run` handler.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Arguments(_) => 2, // EX_USAGE
            CliError::Io(_) => 74,       // EX_IOERR
            CliError::Config(_) => 78,   // EX_CONFIG
            CliError::Process(_) => 71,  // EX_OSERR
        }
    }
}

/// Exit code for an error surfacing from `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>()
        .map_or(1, CliError::exit_code)
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::UnknownKey(_) | PathError::EmptyPath => CliError::Arguments(err.to_string()),
            PathError::CreateFailed { .. } | PathError::EnvFileError { .. } => {
                CliError::Io(err.to_string())
            }
            _ => CliError::Config(err.to_string()),
        }
    }
}

impl From<ProfileError> for CliError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Read { .. } => CliError::Io(err.to_string()),
            _ => CliError::Config(err.to_string()),
        }
    }
}

impl From<InterpreterError> for CliError {
    fn from(err: InterpreterError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoFolds | SessionError::DuplicateFold(_) => {
                CliError::Arguments(err.to_string())
            }
            SessionError::Launch { .. } => CliError::Process(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

//! Launcher trait definition.
//!
//! This port defines the interface for executing a fully-resolved
//! inference command. Implementations handle all process lifecycle details
//! internally; callers only see the plan going in and the outcome coming
//! out.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exit code reported when nothing better is known.
const GENERIC_FAILURE: i32 = 1;

/// A fully-resolved external command.
///
/// Plans are plain data: they can be printed, compared in tests, or handed
/// to any [`Launcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    /// Interpreter or binary to execute.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<String>,
    /// Extra environment variables (added to the inherited environment).
    pub envs: Vec<(String, String)>,
    /// Working directory, if different from the current one.
    pub working_dir: Option<PathBuf>,
}

impl LaunchPlan {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            working_dir: None,
        }
    }

    /// Value of an environment variable set by this plan.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value following `flag` in the argument list.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Whether a bare flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Render as a copy-pasteable shell line: `KEY=value program args...`.
    pub fn display_command(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.envs {
            let _ = write!(out, "{key}={} ", shell_quote(value));
        }
        out.push_str(&shell_quote(&self.program.to_string_lossy()));
        for arg in &self.args {
            out.push(' ');
            out.push_str(&shell_quote(arg));
        }
        out
    }

    /// Arguments as `OsString`s for process APIs.
    pub fn os_args(&self) -> impl Iterator<Item = OsString> + '_ {
        self.args.iter().map(OsString::from)
    }
}

/// Quote a word for POSIX shells when it contains anything unusual.
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOutcome {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Terminating signal number (Unix), when killed by a signal.
    pub signal: Option<i32>,
    /// Whether the launcher interrupted the process (Ctrl+C / cancellation).
    pub interrupted: bool,
    /// Wall-clock time from spawn to reap.
    pub duration: Duration,
}

impl LaunchOutcome {
    /// Outcome of a process that exited on its own with `code`.
    pub const fn exited(code: i32, duration: Duration) -> Self {
        Self {
            code: Some(code),
            signal: None,
            interrupted: false,
            duration,
        }
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0)) && !self.interrupted
    }

    /// Shell-style exit code: the process's own code, `128 + signal` for
    /// signal deaths, 130 for an interruption without a status, else 1.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) if self.interrupted => 130,
            (None, None) => GENERIC_FAILURE,
        }
    }
}

/// Errors raised by a launcher before an outcome exists.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The process could not be started.
    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: PathBuf, reason: String },

    /// Waiting on the process failed.
    #[error("Failed to wait for process: {0}")]
    Wait(String),

    /// Shutting the process down after an interruption failed.
    #[error("Failed to stop process: {0}")]
    Shutdown(String),
}

/// Executes launch plans.
///
/// This trait abstracts process execution for testability: sessions are
/// tested against a mock, the CLI wires in the real process launcher.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run the plan to completion and report how it ended.
    async fn launch(&self, plan: &LaunchPlan) -> Result<LaunchOutcome, LaunchError>;
}

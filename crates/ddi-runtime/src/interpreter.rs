//! Python interpreter resolution.
//!
//! Priority: explicit value (CLI flag) > `DDI_PYTHON` > the first of
//! [`PYTHON_CANDIDATES`] found on `PATH`. An explicit or env value may be a
//! path or a bare command name; bare names are looked up on `PATH` too.

use std::fmt;
use std::path::{Path, PathBuf};

use ddi_core::paths::{PYTHON_ENV, PathError, normalize_user_path};
use thiserror::Error;
use tracing::debug;

#[cfg(target_os = "windows")]
pub const PYTHON_CANDIDATES: &[&str] = &["python"];

#[cfg(not(target_os = "windows"))]
pub const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Errors that can occur while locating the interpreter.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("Python interpreter not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Python interpreter is not executable: {path}")]
    NotExecutable { path: PathBuf },

    #[error("Python not found in PATH (tried: {0})")]
    NotOnPath(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Where the interpreter path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterSource {
    Explicit,
    EnvVar,
    SearchPath,
}

impl fmt::Display for InterpreterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::EnvVar => write!(f, "env:{PYTHON_ENV}"),
            Self::SearchPath => write!(f, "PATH"),
        }
    }
}

/// A located interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub path: PathBuf,
    pub source: InterpreterSource,
}

/// Resolve the interpreter used to run the entry point.
pub fn resolve_interpreter(explicit: Option<&str>) -> Result<Interpreter, InterpreterError> {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        let path = locate(raw)?;
        debug!(path = %path.display(), "Using explicit Python interpreter");
        return Ok(Interpreter {
            path,
            source: InterpreterSource::Explicit,
        });
    }

    if let Ok(raw) = std::env::var(PYTHON_ENV)
        && !raw.trim().is_empty()
    {
        let path = locate(&raw)?;
        debug!(path = %path.display(), "Using Python interpreter from {PYTHON_ENV}");
        return Ok(Interpreter {
            path,
            source: InterpreterSource::EnvVar,
        });
    }

    for candidate in PYTHON_CANDIDATES {
        if let Ok(path) = which::which(candidate) {
            debug!(path = %path.display(), "Found Python interpreter on PATH");
            return Ok(Interpreter {
                path,
                source: InterpreterSource::SearchPath,
            });
        }
    }

    Err(InterpreterError::NotOnPath(PYTHON_CANDIDATES.join(", ")))
}

fn locate(raw: &str) -> Result<PathBuf, InterpreterError> {
    let raw = raw.trim();
    let is_bare_name = !raw.contains(std::path::MAIN_SEPARATOR) && !raw.contains('/');
    if is_bare_name && !raw.starts_with('~') {
        return which::which(raw).map_err(|_| InterpreterError::NotOnPath(raw.to_string()));
    }

    let path = normalize_user_path(raw)?;
    validate_executable(&path)?;
    Ok(path)
}

/// Check that a file exists and (on Unix) has an execute bit set.
pub(crate) fn validate_executable(path: &Path) -> Result<(), InterpreterError> {
    if !path.is_file() {
        return Err(InterpreterError::NotFound {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)
            .map(|m| m.permissions().mode())
            .unwrap_or(0);
        if mode & 0o111 == 0 {
            return Err(InterpreterError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

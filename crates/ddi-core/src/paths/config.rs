//! Configuration file utilities.
//!
//! User overrides live in `<home>/.env` as plain `KEY=value` lines. The CLI
//! loads that file into the process environment at startup, so anything
//! persisted here feeds straight into root resolution.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::error::PathError;
use super::roots::RootKind;

/// Environment variable naming the Python interpreter.
pub const PYTHON_ENV: &str = "DDI_PYTHON";

/// Keys that may be persisted into `.env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Root(RootKind),
    Python,
}

impl ConfigKey {
    pub const ALL: [Self; 5] = [
        Self::Root(RootKind::DataRoot),
        Self::Root(RootKind::SaveRoot),
        Self::Root(RootKind::UserDir),
        Self::Root(RootKind::EntryPoint),
        Self::Python,
    ];

    /// Environment variable written to `.env`.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::Root(kind) => kind.env_var(),
            Self::Python => PYTHON_ENV,
        }
    }

    /// Kebab-case name accepted on the command line.
    pub const fn cli_name(self) -> &'static str {
        match self {
            Self::Root(RootKind::DataRoot) => "data-root",
            Self::Root(RootKind::SaveRoot) => "save-root",
            Self::Root(RootKind::UserDir) => "user-dir",
            Self::Root(RootKind::EntryPoint) => "entry-point",
            Self::Python => "python",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = PathError;

    /// Accepts either the CLI name (`data-root`) or the variable (`DDI_DATA_ROOT`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.cli_name() == s || key.env_var() == s)
            .ok_or_else(|| PathError::UnknownKey(s.to_string()))
    }
}

/// Location of the `.env` file under the given home.
pub fn env_file_path(home: &Path) -> PathBuf {
    home.join(".env")
}

/// Read all `KEY=value` pairs from an env file, skipping blanks and comments.
///
/// A missing file reads as empty.
pub fn read_env_values(env_path: &Path) -> Result<Vec<(String, String)>, PathError> {
    if !env_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(env_path).map_err(|e| PathError::EnvFileError {
        path: env_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), unquote_env_value(v.trim())))
        .collect())
}

/// Render a value so the `.env` loader reads it back unchanged.
///
/// Plain values stay bare; anything else is single-quoted, with embedded
/// `'` written as `'\''`.
pub fn quote_env_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:,+@%~".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Inverse of [`quote_env_value`], also accepting double quotes and
/// backslash escapes outside quotes.
fn unquote_env_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => out.extend(chars.by_ref().take_while(|&c| c != '\'')),
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => out.extend(chars.next()),
                        _ => out.push(c),
                    }
                }
            }
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Persist a key=value pair into the env file.
///
/// If the key already exists, its value is updated in place.
/// If the key doesn't exist, it is appended to the file.
pub fn persist_env_value(env_path: &Path, key: &str, value: &str) -> Result<(), PathError> {
    let mut output = Vec::new();
    let mut updated = false;
    let entry = format!("{key}={}", quote_env_value(value));

    for line in read_lines(env_path)? {
        match line.split_once('=') {
            Some((lhs, _)) if lhs.trim() == key => {
                if !updated {
                    output.push(entry.clone());
                    updated = true;
                }
            }
            _ => output.push(line),
        }
    }

    if !updated {
        output.push(entry);
    }

    write_lines(env_path, &output)?;
    debug!(key, path = %env_path.display(), updated, "Persisted env value");
    Ok(())
}

/// Remove a key from the env file. Returns whether it was present.
pub fn remove_env_value(env_path: &Path, key: &str) -> Result<bool, PathError> {
    let lines = read_lines(env_path)?;
    let before = lines.len();
    let output: Vec<String> = lines
        .into_iter()
        .filter(|line| !matches!(line.split_once('='), Some((lhs, _)) if lhs.trim() == key))
        .collect();

    if output.len() == before {
        return Ok(false);
    }

    write_lines(env_path, &output)?;
    debug!(key, path = %env_path.display(), "Removed env value");
    Ok(true)
}

fn read_lines(env_path: &Path) -> Result<Vec<String>, PathError> {
    if !env_path.exists() {
        return Ok(Vec::new());
    }

    Ok(fs::read_to_string(env_path)
        .map_err(|e| PathError::EnvFileError {
            path: env_path.to_path_buf(),
            reason: e.to_string(),
        })?
        .lines()
        .map(std::string::ToString::to_string)
        .collect())
}

fn write_lines(env_path: &Path, lines: &[String]) -> Result<(), PathError> {
    if let Some(parent) = env_path.parent() {
        fs::create_dir_all(parent).map_err(|e| PathError::CreateFailed {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(env_path)
        .map_err(|e| PathError::EnvFileError {
            path: env_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    file.write_all(content.as_bytes())
        .map_err(|e| PathError::EnvFileError {
            path: env_path.to_path_buf(),
            reason: e.to_string(),
        })
}

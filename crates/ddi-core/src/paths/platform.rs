//! Platform-specific home directory detection and user path normalization.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the launcher home directory.
pub const HOME_ENV: &str = "DDI_HOME";

/// Directory name used under the platform data directory.
const APP_DIR_NAME: &str = "ddi-infer";

/// Platform default for the launcher home (e.g. `~/.local/share/ddi-infer`).
///
/// The directory is not created here; only `.env` writers create it.
pub(super) fn default_home() -> Result<PathBuf, PathError> {
    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join(APP_DIR_NAME))
}

/// Normalize a user-provided path, expanding `~` and making it absolute.
pub fn normalize_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let expanded = if trimmed.starts_with("~/") || trimmed == "~" {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        if trimmed == "~" {
            home
        } else {
            home.join(trimmed.trim_start_matches("~/"))
        }
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}

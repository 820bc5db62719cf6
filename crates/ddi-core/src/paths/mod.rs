//! Path utilities for launcher roots and user-configurable locations.
//!
//! This module provides the canonical path resolution for all launcher
//! components:
//! - Launcher home and the `.env` override file
//! - Data root, checkpoint (save) root, toolkit user dir, entry point
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O
//! - Resolution never touches the filesystem; only `.env` writers do

mod config;
mod error;
mod platform;
mod roots;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    ConfigKey, PYTHON_ENV, env_file_path, persist_env_value, quote_env_value, read_env_values,
    remove_env_value,
};
pub use error::PathError;
pub use platform::{HOME_ENV, normalize_user_path};
pub use roots::{
    ResolvedRoots, RootKind, RootOverrides, RootResolution, RootSource, resolve_home,
    resolve_root,
};

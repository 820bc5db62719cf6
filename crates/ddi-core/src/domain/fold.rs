//! Data fold names.
//!
//! A fold selects one cross-validation partition under the data root and
//! the matching checkpoint directory under the save root. Because the name
//! becomes a single path component in both places, it is validated once
//! here and carried around as a [`Fold`] afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a fold name (or any other single path component) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    #[error("Name cannot be empty")]
    Empty,

    #[error("Name '{0}' has leading or trailing whitespace")]
    Whitespace(String),

    #[error("Name '{0}' must be a single path component (no '/' or '\\')")]
    PathSeparator(String),

    #[error("Name '{0}' is reserved")]
    Reserved(String),

    #[error("Name contains a NUL byte")]
    Nul,
}

/// Check that `name` is usable as exactly one path component.
///
/// Shared by every value that is joined under a root directory.
pub fn check_path_component(name: &str) -> Result<(), FoldError> {
    if name.is_empty() {
        return Err(FoldError::Empty);
    }
    if name.contains('\0') {
        return Err(FoldError::Nul);
    }
    if name.trim() != name {
        return Err(FoldError::Whitespace(name.to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(FoldError::PathSeparator(name.to_string()));
    }
    if name == "." || name == ".." {
        return Err(FoldError::Reserved(name.to_string()));
    }
    Ok(())
}

/// A validated data fold name (e.g. `fold0`, `fold3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fold(String);

impl Fold {
    /// Validate and wrap a fold name.
    pub fn new(name: impl Into<String>) -> Result<Self, FoldError> {
        let name = name.into();
        check_path_component(&name)?;
        Ok(Self(name))
    }

    /// The fold name as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fold {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Fold {
    type Error = FoldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fold> for String {
    fn from(fold: Fold) -> Self {
        fold.0
    }
}

impl AsRef<str> for Fold {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Launch root resolution.
//!
//! Every filesystem location the launcher hands to the external program is
//! derived from a handful of roots. Each root resolves the same way:
//!
//! 1. Explicit path provided by the caller (CLI flag)
//! 2. Its environment variable (which `.env` may have populated)
//! 3. A default under the launcher home
//!
//! The winning source is recorded so `ddi-infer paths` can explain it.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::{HOME_ENV, default_home, normalize_user_path};

/// How a root was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    /// The user passed an explicit path (CLI flag).
    Explicit,
    /// The path came from an environment variable / `.env`.
    EnvVar,
    /// Fallback default.
    Default,
}

/// One resolved root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResolution {
    pub path: PathBuf,
    pub source: RootSource,
}

impl RootResolution {
    fn new(path: PathBuf, source: RootSource) -> Self {
        Self { path, source }
    }
}

/// The roots derived from the launcher home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    DataRoot,
    SaveRoot,
    UserDir,
    EntryPoint,
}

impl RootKind {
    pub const ALL: [Self; 4] = [
        Self::DataRoot,
        Self::SaveRoot,
        Self::UserDir,
        Self::EntryPoint,
    ];

    /// Environment variable consulted for this root.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::DataRoot => "DDI_DATA_ROOT",
            Self::SaveRoot => "DDI_SAVE_ROOT",
            Self::UserDir => "DDI_USER_DIR",
            Self::EntryPoint => "DDI_ENTRY_POINT",
        }
    }

    /// Default location relative to the launcher home.
    pub const fn default_relative(self) -> &'static str {
        match self {
            Self::DataRoot => "data",
            Self::SaveRoot => "ckpt",
            Self::UserDir => "ddi_zoo",
            Self::EntryPoint => "binary_class_inf.py",
        }
    }

    /// Key printed by `ResolvedRoots`' `Display`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::DataRoot => "data_root",
            Self::SaveRoot => "save_root",
            Self::UserDir => "user_dir",
            Self::EntryPoint => "entry_point",
        }
    }
}

/// Explicit per-invocation overrides (raw strings from the CLI).
#[derive(Debug, Clone, Default)]
pub struct RootOverrides {
    pub home: Option<String>,
    pub data_root: Option<String>,
    pub save_root: Option<String>,
    pub user_dir: Option<String>,
    pub entry_point: Option<String>,
}

impl RootOverrides {
    fn get(&self, kind: RootKind) -> Option<&str> {
        match kind {
            RootKind::DataRoot => self.data_root.as_deref(),
            RootKind::SaveRoot => self.save_root.as_deref(),
            RootKind::UserDir => self.user_dir.as_deref(),
            RootKind::EntryPoint => self.entry_point.as_deref(),
        }
    }
}

/// Resolve the launcher home from an explicit override, `DDI_HOME`, or the platform default.
pub fn resolve_home(explicit: Option<&str>) -> Result<RootResolution, PathError> {
    if let Some(raw) = explicit {
        return Ok(RootResolution::new(
            normalize_user_path(raw)?,
            RootSource::Explicit,
        ));
    }

    if let Some(raw) = non_blank_env(HOME_ENV) {
        return Ok(RootResolution::new(
            normalize_user_path(&raw)?,
            RootSource::EnvVar,
        ));
    }

    Ok(RootResolution::new(default_home()?, RootSource::Default))
}

/// Resolve a single root against an already-resolved home.
pub fn resolve_root(
    kind: RootKind,
    explicit: Option<&str>,
    home: &Path,
) -> Result<RootResolution, PathError> {
    if let Some(raw) = explicit {
        return Ok(RootResolution::new(
            normalize_user_path(raw)?,
            RootSource::Explicit,
        ));
    }

    if let Some(raw) = non_blank_env(kind.env_var()) {
        return Ok(RootResolution::new(
            normalize_user_path(&raw)?,
            RootSource::EnvVar,
        ));
    }

    Ok(RootResolution::new(
        home.join(kind.default_relative()),
        RootSource::Default,
    ))
}

fn non_blank_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// All launch roots captured in a single struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoots {
    pub home: RootResolution,
    pub data_root: RootResolution,
    pub save_root: RootResolution,
    pub user_dir: RootResolution,
    pub entry_point: RootResolution,
}

impl ResolvedRoots {
    /// Resolve every root using the current environment.
    pub fn resolve(overrides: &RootOverrides) -> Result<Self, PathError> {
        let home = resolve_home(overrides.home.as_deref())?;
        let resolve = |kind: RootKind| resolve_root(kind, overrides.get(kind), &home.path);

        Ok(Self {
            data_root: resolve(RootKind::DataRoot)?,
            save_root: resolve(RootKind::SaveRoot)?,
            user_dir: resolve(RootKind::UserDir)?,
            entry_point: resolve(RootKind::EntryPoint)?,
            home,
        })
    }

    /// Roots laid out with their defaults under `home`, ignoring the environment.
    pub fn under(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let default = |kind: RootKind| {
            RootResolution::new(home.join(kind.default_relative()), RootSource::Default)
        };

        Self {
            data_root: default(RootKind::DataRoot),
            save_root: default(RootKind::SaveRoot),
            user_dir: default(RootKind::UserDir),
            entry_point: default(RootKind::EntryPoint),
            home: RootResolution::new(home, RootSource::Explicit),
        }
    }

    pub fn get(&self, kind: RootKind) -> &RootResolution {
        match kind {
            RootKind::DataRoot => &self.data_root,
            RootKind::SaveRoot => &self.save_root,
            RootKind::UserDir => &self.user_dir,
            RootKind::EntryPoint => &self.entry_point,
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root.path
    }

    pub fn save_root(&self) -> &Path {
        &self.save_root.path
    }

    pub fn user_dir(&self) -> &Path {
        &self.user_dir.path
    }

    pub fn entry_point(&self) -> &Path {
        &self.entry_point.path
    }
}

impl fmt::Display for ResolvedRoots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "home = {} ({:?})",
            self.home.path.display(),
            self.home.source
        )?;
        for (i, kind) in RootKind::ALL.iter().enumerate() {
            let root = self.get(*kind);
            write!(
                f,
                "{} = {} ({:?})",
                kind.label(),
                root.path.display(),
                root.source
            )?;
            if i + 1 < RootKind::ALL.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

//! CLI bootstrap - the composition root.
//!
//! This module is the only place where configuration sources are combined:
//! - Global CLI options
//! - `<home>/.env` (loaded into the process environment, never overriding it)
//! - The optional JSON profile
//!
//! Handlers receive a [`CliContext`] and never resolve roots themselves.

use std::path::{Path, PathBuf};

use ddi_core::paths::{env_file_path, resolve_home};
use ddi_core::{InferenceProfile, ProfileOverrides, ResolvedRoots, RootOverrides};
use ddi_runtime::{Interpreter, LaunchContext, resolve_interpreter};
use tracing::{debug, warn};

use crate::error::CliError;
use crate::parser::Cli;

/// Variable naming the JSON profile (also read from `.env`).
pub const PROFILE_ENV: &str = "DDI_PROFILE";

/// Bootstrap configuration taken from the global options.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub roots: RootOverrides,
    pub profile_path: Option<String>,
    pub python: Option<String>,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            roots: RootOverrides {
                home: cli.home.clone(),
                data_root: cli.data_root.clone(),
                save_root: cli.save_root.clone(),
                user_dir: cli.user_dir.clone(),
                entry_point: cli.entry_point.clone(),
            },
            profile_path: cli.profile.clone(),
            python: cli.python.clone(),
        }
    }
}

/// Resolved configuration shared by all command handlers.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: CliConfig,
    pub roots: ResolvedRoots,
    /// Location of the `.env` file (may not exist).
    pub env_file: PathBuf,
}

impl CliContext {
    pub fn home(&self) -> &Path {
        &self.roots.home.path
    }

    /// The profile: defaults, then the JSON file, then `overrides`; validated.
    pub fn profile(&self, overrides: &ProfileOverrides) -> Result<InferenceProfile, CliError> {
        let base = match self.config.profile_path.as_deref() {
            Some(raw) => {
                let path = ddi_core::paths::normalize_user_path(raw)?;
                debug!(path = %path.display(), "Loading profile");
                InferenceProfile::from_json_file(&path)?
            }
            None => InferenceProfile::default(),
        };
        let profile = base.with_overrides(overrides);
        profile.validate()?;
        Ok(profile)
    }

    pub fn interpreter(&self) -> Result<Interpreter, CliError> {
        Ok(resolve_interpreter(self.config.python.as_deref())?)
    }

    /// Everything a session needs for this invocation.
    pub fn launch_context(&self, overrides: &ProfileOverrides) -> Result<LaunchContext, CliError> {
        let profile = self.profile(overrides)?;
        let interpreter = self.interpreter()?;
        Ok(LaunchContext::new(
            interpreter.path,
            self.roots.clone(),
            profile,
        ))
    }
}

/// Bootstrap the CLI context.
///
/// 1. Resolve the home directory
/// 2. Load `<home>/.env` without overriding variables already set
/// 3. Pick up `DDI_PROFILE` from `.env` when no profile was given
/// 4. Resolve every root
pub fn bootstrap(mut config: CliConfig) -> Result<CliContext, CliError> {
    let home = resolve_home(config.roots.home.as_deref())?;
    let env_file = env_file_path(&home.path);

    if env_file.is_file() {
        match dotenvy::from_path(&env_file) {
            Ok(()) => debug!(path = %env_file.display(), "Loaded env file"),
            Err(e) => warn!(path = %env_file.display(), error = %e, "Ignoring unreadable env file"),
        }
    }

    if config.profile_path.is_none() {
        config.profile_path = std::env::var(PROFILE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
    }

    let roots = ResolvedRoots::resolve(&config.roots)?;
    debug!(home = %roots.home.path.display(), "Roots resolved");

    Ok(CliContext {
        config,
        roots,
        env_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddi_core::paths::{RootSource, persist_env_value};
    use ddi_core::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use ddi_core::{Architecture, Precision};
    use std::fs;
    use tempfile::TempDir;

    fn config(home: &Path) -> CliConfig {
        CliConfig {
            roots: RootOverrides {
                home: Some(home.to_string_lossy().into_owned()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn env_file_feeds_root_resolution() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _unset = EnvVarGuard::unset("DDI_SAVE_ROOT");
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "DDI_SAVE_ROOT=/ckpt/from-env-file\n").unwrap();

        // `_unset` also clears what dotenvy sets when it drops
        let ctx = bootstrap(config(temp.path())).unwrap();

        assert_eq!(ctx.roots.save_root(), Path::new("/ckpt/from-env-file"));
        assert_eq!(ctx.roots.save_root.source, RootSource::EnvVar);
        assert_eq!(ctx.env_file, temp.path().join(".env"));
    }

    #[test]
    fn process_env_wins_over_env_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("DDI_DATA_ROOT", "/data/from-process");
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "DDI_DATA_ROOT=/data/from-file\n").unwrap();

        let ctx = bootstrap(config(temp.path())).unwrap();

        assert_eq!(ctx.roots.data_root(), Path::new("/data/from-process"));
    }

    #[test]
    fn profile_file_then_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let profile_path = temp.path().join("profile.json");
        fs::write(&profile_path, r#"{"arch": "drug_gcn_tiny", "batch_size": 32}"#).unwrap();

        let mut cfg = config(temp.path());
        cfg.profile_path = Some(profile_path.to_string_lossy().into_owned());
        let ctx = bootstrap(cfg).unwrap();

        let overrides = ProfileOverrides {
            precision: Some(Precision::Bf16),
            ..Default::default()
        };
        let profile = ctx.profile(&overrides).unwrap();
        assert_eq!(profile.arch, Architecture::DrugGcnTiny);
        assert_eq!(profile.batch_size, 32);
        assert_eq!(profile.precision, Precision::Bf16);
    }

    #[test]
    fn persisted_path_with_spaces_survives_env_loading() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _data = EnvVarGuard::unset("DDI_DATA_ROOT");
        let _save = EnvVarGuard::unset("DDI_SAVE_ROOT");
        let temp = TempDir::new().unwrap();
        let env_file = env_file_path(temp.path());
        persist_env_value(&env_file, "DDI_DATA_ROOT", "/srv/my folds").unwrap();
        persist_env_value(&env_file, "DDI_SAVE_ROOT", "/srv/ckpt").unwrap();

        let ctx = bootstrap(config(temp.path())).unwrap();

        assert_eq!(ctx.roots.data_root(), Path::new("/srv/my folds"));
        assert_eq!(ctx.roots.save_root(), Path::new("/srv/ckpt"));
        assert_eq!(ctx.roots.data_root.source, RootSource::EnvVar);
    }

    #[test]
    fn profile_named_in_env_file_is_used() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _profile = EnvVarGuard::unset(PROFILE_ENV);
        let temp = TempDir::new().unwrap();
        let profile_path = temp.path().join("profile.json");
        fs::write(&profile_path, r#"{"batch_size": 24}"#).unwrap();
        persist_env_value(
            &env_file_path(temp.path()),
            PROFILE_ENV,
            &profile_path.to_string_lossy(),
        )
        .unwrap();

        let ctx = bootstrap(config(temp.path())).unwrap();

        assert_eq!(
            ctx.config.profile_path.as_deref(),
            profile_path.to_str()
        );
        let profile = ctx.profile(&ProfileOverrides::default()).unwrap();
        assert_eq!(profile.batch_size, 24);
    }

    #[test]
    fn explicit_profile_wins_over_env_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _profile = EnvVarGuard::unset(PROFILE_ENV);
        let temp = TempDir::new().unwrap();
        let from_file = temp.path().join("from-env.json");
        let explicit = temp.path().join("explicit.json");
        fs::write(&from_file, r#"{"batch_size": 24}"#).unwrap();
        fs::write(&explicit, r#"{"batch_size": 48}"#).unwrap();
        persist_env_value(
            &env_file_path(temp.path()),
            PROFILE_ENV,
            &from_file.to_string_lossy(),
        )
        .unwrap();

        let mut cfg = config(temp.path());
        cfg.profile_path = Some(explicit.to_string_lossy().into_owned());
        let ctx = bootstrap(cfg).unwrap();

        let profile = ctx.profile(&ProfileOverrides::default()).unwrap();
        assert_eq!(profile.batch_size, 48);
    }

    #[test]
    fn invalid_override_is_config_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let ctx = bootstrap(config(temp.path())).unwrap();

        let overrides = ProfileOverrides {
            batch_size: Some(0),
            ..Default::default()
        };
        let err = ctx.profile(&overrides).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }
}

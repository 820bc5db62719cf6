//! Per-fold directory layout.
//!
//! Given the resolved roots, the profile and a fold, the launcher needs
//! three paths:
//!
//! ```text
//! data_dir        = <data_root>/<fold>/data-bin
//! save_dir        = <save_root>/<task>/<arch>/<criterion>/<fold>
//! checkpoint_path = <save_dir>/<checkpoint_file>
//! ```
//!
//! Derivation is pure: it never touches the filesystem, so a missing
//! directory is reported later by preflight (or by the toolkit itself).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::Fold;
use crate::profile::InferenceProfile;

/// Binarized dataset directory name under each fold.
pub const DATA_BIN_DIR: &str = "data-bin";

/// Paths for one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub fold: Fold,
    pub data_dir: PathBuf,
    pub save_dir: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl RunLayout {
    /// Derive the layout of `fold` under the given roots.
    pub fn derive(
        data_root: &Path,
        save_root: &Path,
        profile: &InferenceProfile,
        fold: &Fold,
    ) -> Self {
        let data_dir = data_root.join(fold.as_str()).join(DATA_BIN_DIR);
        let save_dir = save_root
            .join(&profile.task)
            .join(profile.arch.name())
            .join(&profile.criterion)
            .join(fold.as_str());
        let checkpoint_path = save_dir.join(&profile.checkpoint_file);

        Self {
            fold: fold.clone(),
            data_dir,
            save_dir,
            checkpoint_path,
        }
    }
}

impl fmt::Display for RunLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fold = {}", self.fold)?;
        writeln!(f, "data_dir = {}", self.data_dir.display())?;
        writeln!(f, "save_dir = {}", self.save_dir.display())?;
        write!(f, "checkpoint = {}", self.checkpoint_path.display())
    }
}

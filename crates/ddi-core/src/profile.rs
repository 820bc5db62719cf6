//! The inference profile: every fixed flag handed to the entry point.
//!
//! `InferenceProfile::default()` is the canonical launch configuration
//! (large GCN, MLP head, fp16, batch 128, `test` subset). A JSON profile
//! file may override any subset of fields; CLI flags are merged on top via
//! [`ProfileOverrides`]. Validation runs once, after merging.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Architecture, ClassificationHead, DdpBackend, DeviceSelection, FoldError, GnnNorm, Precision,
    check_path_component,
};

/// Largest `--max-positions` accepted.
pub const MAX_POSITIONS_LIMIT: u32 = 65_536;

/// Profile validation and loading errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Field '{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("Field '{field}' must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u32,
        value: u32,
    },

    #[error("max_positions must be between 1 and 65536, got {0}")]
    InvalidMaxPositions(u32),

    #[error("checkpoint_file must be a bare file name, got '{0}'")]
    InvalidCheckpointFile(String),

    #[error("Field '{field}' must be a single directory name: {source}")]
    InvalidPathComponent {
        field: &'static str,
        #[source]
        source: FoldError,
    },

    #[error("Failed to read profile {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid profile {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Fixed launch flags for one inference run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceProfile {
    /// Toolkit task name (`--task`).
    pub task: String,
    /// Model architecture (`--arch`).
    pub arch: Architecture,
    /// Loss criterion name (`--criterion`).
    pub criterion: String,
    /// Prediction head (`--classification-head-name`).
    pub classification_head: ClassificationHead,
    /// Number of output classes (`--num-classes`).
    pub num_classes: u32,
    /// Maximum input positions (`--max-positions`).
    pub max_positions: u32,
    /// Inference batch size (`--batch-size`).
    pub batch_size: u32,
    /// Optimizer name; required by the toolkit's argument parser even at inference.
    pub optimizer: String,
    /// GNN normalization (`--gnn-norm`).
    pub gnn_norm: GnnNorm,
    /// Precision mode (`--fp16` / `--bf16` / none).
    pub precision: Precision,
    /// DDP backend (`--ddp-backend`).
    pub ddp_backend: DdpBackend,
    /// Source language tag (`-s`).
    pub source_lang: String,
    /// Target language tag (`-t`).
    pub target_lang: String,
    /// Subset evaluated (`--valid-subset`).
    pub valid_subset: String,
    /// Pass `--reset-dataloader`.
    pub reset_dataloader: bool,
    /// Pass `--no-progress-bar`.
    pub no_progress_bar: bool,
    /// Checkpoint file name inside the save directory.
    pub checkpoint_file: String,
    /// Accelerators visible to the process (`CUDA_VISIBLE_DEVICES`).
    pub device: DeviceSelection,
    /// Override the architecture's GNN depth (`--gnn-number-layer`).
    pub gnn_number_layer: Option<u32>,
    /// Override the architecture's GNN width (`--gnn-embed-dim`).
    pub gnn_embed_dim: Option<u32>,
    /// Extra arguments appended verbatim after all fixed flags.
    pub extra_args: Vec<String>,
}

impl Default for InferenceProfile {
    fn default() -> Self {
        Self {
            task: "binary_class_task".to_string(),
            arch: Architecture::DrugGcnLarge,
            criterion: "binary_class_loss_bce".to_string(),
            classification_head: ClassificationHead::BinaryClassMlp,
            num_classes: 86,
            max_positions: 512,
            batch_size: 128,
            optimizer: "adam".to_string(),
            gnn_norm: GnnNorm::Layer,
            precision: Precision::Fp16,
            ddp_backend: DdpBackend::LegacyDdp,
            source_lang: "a".to_string(),
            target_lang: "b".to_string(),
            valid_subset: "test".to_string(),
            reset_dataloader: true,
            no_progress_bar: true,
            checkpoint_file: "checkpoint_best.pt".to_string(),
            device: DeviceSelection::default(),
            gnn_number_layer: None,
            gnn_embed_dim: None,
            extra_args: Vec::new(),
        }
    }
}

impl InferenceProfile {
    /// Load a (possibly partial) profile from a JSON file.
    ///
    /// Missing fields take their defaults; unknown fields are rejected so
    /// typos don't silently fall back to a default.
    pub fn from_json_file(path: &Path) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path).map_err(|e| ProfileError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ProfileError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Pretty JSON for `ddi-infer config profile-template`.
    pub fn to_json_pretty(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Apply CLI overrides on top of this profile.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ProfileOverrides) -> Self {
        overrides.apply(&mut self);
        self
    }

    /// Check every field against what the toolkit will accept.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let required = [
            ("task", &self.task),
            ("criterion", &self.criterion),
            ("optimizer", &self.optimizer),
            ("source_lang", &self.source_lang),
            ("target_lang", &self.target_lang),
            ("valid_subset", &self.valid_subset),
            ("checkpoint_file", &self.checkpoint_file),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProfileError::EmptyField(field));
            }
        }

        // Joined under the save root
        for (field, value) in [("task", &self.task), ("criterion", &self.criterion)] {
            check_path_component(value)
                .map_err(|source| ProfileError::InvalidPathComponent { field, source })?;
        }

        let bare = Path::new(&self.checkpoint_file).file_name()
            == Some(OsStr::new(&self.checkpoint_file));
        if !bare {
            return Err(ProfileError::InvalidCheckpointFile(
                self.checkpoint_file.clone(),
            ));
        }

        at_least("num_classes", self.num_classes, 1)?;
        at_least("batch_size", self.batch_size, 1)?;

        if !(1..=MAX_POSITIONS_LIMIT).contains(&self.max_positions) {
            return Err(ProfileError::InvalidMaxPositions(self.max_positions));
        }

        if let Some(layers) = self.gnn_number_layer {
            at_least("gnn_number_layer", layers, 1)?;
        }
        if let Some(dim) = self.gnn_embed_dim {
            at_least("gnn_embed_dim", dim, 1)?;
        }

        Ok(())
    }

    /// GNN depth the model will run with.
    pub fn effective_gnn_number_layer(&self) -> u32 {
        self.gnn_number_layer
            .unwrap_or_else(|| self.arch.gnn_number_layer())
    }

    /// GNN width the model will run with.
    pub fn effective_gnn_embed_dim(&self) -> u32 {
        self.gnn_embed_dim
            .unwrap_or_else(|| self.arch.gnn_embed_dim())
    }
}

fn at_least(field: &'static str, value: u32, min: u32) -> Result<(), ProfileError> {
    if value < min {
        return Err(ProfileError::TooSmall { field, min, value });
    }
    Ok(())
}

/// Per-invocation overrides; `None` leaves the profile value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub task: Option<String>,
    pub arch: Option<Architecture>,
    pub criterion: Option<String>,
    pub classification_head: Option<ClassificationHead>,
    pub num_classes: Option<u32>,
    pub max_positions: Option<u32>,
    pub batch_size: Option<u32>,
    pub gnn_norm: Option<GnnNorm>,
    pub precision: Option<Precision>,
    pub valid_subset: Option<String>,
    pub checkpoint_file: Option<String>,
    pub device: Option<DeviceSelection>,
    pub extra_args: Vec<String>,
}

impl ProfileOverrides {
    fn apply(&self, profile: &mut InferenceProfile) {
        if let Some(ref task) = self.task {
            profile.task.clone_from(task);
        }
        if let Some(arch) = self.arch {
            profile.arch = arch;
        }
        if let Some(ref criterion) = self.criterion {
            profile.criterion.clone_from(criterion);
        }
        if let Some(head) = self.classification_head {
            profile.classification_head = head;
        }
        if let Some(n) = self.num_classes {
            profile.num_classes = n;
        }
        if let Some(n) = self.max_positions {
            profile.max_positions = n;
        }
        if let Some(n) = self.batch_size {
            profile.batch_size = n;
        }
        if let Some(norm) = self.gnn_norm {
            profile.gnn_norm = norm;
        }
        if let Some(precision) = self.precision {
            profile.precision = precision;
        }
        if let Some(ref subset) = self.valid_subset {
            profile.valid_subset.clone_from(subset);
        }
        if let Some(ref file) = self.checkpoint_file {
            profile.checkpoint_file.clone_from(file);
        }
        if let Some(ref device) = self.device {
            profile.device = device.clone();
        }
        profile.extra_args.extend(self.extra_args.iter().cloned());
    }
}

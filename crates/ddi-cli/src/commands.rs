//! Main commands enum and primary subcommands.
//!
//! This module defines the available commands for the CLI tool.

use clap::{Args, Subcommand};

use ddi_core::{
    Architecture, ClassificationHead, DeviceSelection, Fold, GnnNorm, Precision, ProfileOverrides,
};

use crate::config_commands::ConfigCommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run inference for one or more folds, sequentially
    Run(RunArgs),

    /// Print the resolved layout and exact command line for a fold
    Show {
        /// Data fold name (directory under the data root)
        fold: Fold,
        /// Print the launch plan as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Check that everything a fold needs is in place
    Check {
        /// Data fold name (directory under the data root)
        fold: Fold,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// List model architectures and classification heads
    Archs,

    /// Show resolved roots and where each came from
    Paths,

    /// View or change persisted configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments of `run`.
#[derive(Args)]
pub struct RunArgs {
    /// Data fold names, run in the given order
    #[arg(required = true, num_args = 1..)]
    pub folds: Vec<Fold>,

    /// Continue with the next fold after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Print the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Re-emit the process output through the log instead of the terminal
    #[arg(long)]
    pub capture_output: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Extra arguments appended to the entry point command line
    #[arg(last = true)]
    pub extra: Vec<String>,
}

/// Per-invocation overrides of the launch profile.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Toolkit task name
    #[arg(long)]
    pub task: Option<String>,

    /// Model architecture (drug_gcn_tiny, drug_gcn_base, drug_gcn_large)
    #[arg(long)]
    pub arch: Option<Architecture>,

    /// Loss criterion name
    #[arg(long)]
    pub criterion: Option<String>,

    /// Classification head (bclsmlp, bclsFeatInt)
    #[arg(long)]
    pub head: Option<ClassificationHead>,

    /// Number of output classes
    #[arg(long)]
    pub num_classes: Option<u32>,

    /// Maximum input positions
    #[arg(long)]
    pub max_positions: Option<u32>,

    /// Inference batch size
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// GNN normalization (batch, layer, instance)
    #[arg(long)]
    pub gnn_norm: Option<GnnNorm>,

    /// Precision mode (fp32, fp16, bf16)
    #[arg(long)]
    pub precision: Option<Precision>,

    /// Subset to evaluate
    #[arg(long)]
    pub valid_subset: Option<String>,

    /// Checkpoint file name inside the fold's save directory
    #[arg(long)]
    pub checkpoint_file: Option<String>,

    /// Visible GPUs for CUDA_VISIBLE_DEVICES (e.g. "0", "0,1", "none")
    #[arg(long)]
    pub device: Option<DeviceSelection>,
}

impl ProfileArgs {
    /// Convert into profile overrides, appending `extra` after every fixed flag.
    pub fn to_overrides(&self, extra: &[String]) -> ProfileOverrides {
        ProfileOverrides {
            task: self.task.clone(),
            arch: self.arch,
            criterion: self.criterion.clone(),
            classification_head: self.head,
            num_classes: self.num_classes,
            max_positions: self.max_positions,
            batch_size: self.batch_size,
            gnn_norm: self.gnn_norm,
            precision: self.precision,
            valid_subset: self.valid_subset.clone(),
            checkpoint_file: self.checkpoint_file.clone(),
            device: self.device.clone(),
            extra_args: extra.to_vec(),
        }
    }
}

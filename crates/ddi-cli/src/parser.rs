//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for launching DDI binary-classification inference.
///
/// Global options override the matching `DDI_*` environment variables and
/// `<home>/.env` entries for this invocation only.
#[derive(Parser)]
#[command(name = "ddi-infer")]
#[command(about = "Launch drug-drug interaction inference runs per data fold")]
#[command(version)]
pub struct Cli {
    /// Launcher home holding `.env` and the default roots
    #[arg(long, global = true)]
    pub home: Option<String>,

    /// JSON profile overriding the default launch flags
    #[arg(long, global = true, env = crate::bootstrap::PROFILE_ENV)]
    pub profile: Option<String>,

    /// Root holding one directory per fold (`<root>/<fold>/data-bin`)
    #[arg(long = "data-root", global = true)]
    pub data_root: Option<String>,

    /// Root holding trained checkpoints
    #[arg(long = "save-root", global = true)]
    pub save_root: Option<String>,

    /// Toolkit plugin directory passed as `--user-dir`
    #[arg(long = "user-dir", global = true)]
    pub user_dir: Option<String>,

    /// Inference entry point script
    #[arg(long = "entry-point", global = true)]
    pub entry_point: Option<String>,

    /// Python interpreter (path or command name)
    #[arg(long, global = true)]
    pub python: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

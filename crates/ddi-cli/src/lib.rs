//! `ddi-infer` command-line adapter.
//!
//! Parses arguments, composes a [`CliContext`] in [`bootstrap`] and
//! dispatches to the handlers. The binary's exit code is the launched
//! process's own exit status when one ran.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs only
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ProfileArgs, RunArgs};
pub use config_commands::ConfigCommand;
pub use error::{CliError, exit_code_for};
pub use parser::Cli;

/// Run a parsed command line; returns the exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let ctx = bootstrap(CliConfig::from_cli(&cli))?;

    match cli.command {
        Commands::Run(args) => handlers::run::execute(&ctx, args).await,
        Commands::Show {
            fold,
            json,
            profile,
        } => handlers::show::execute(&ctx, &fold, json, &profile).map(|()| 0),
        Commands::Check { fold, profile } => handlers::check::execute(&ctx, &fold, &profile),
        Commands::Archs => handlers::archs::execute().map(|()| 0),
        Commands::Paths => handlers::paths::execute(&ctx).map(|()| 0),
        Commands::Config { command } => handlers::config::execute(&ctx, command).map(|()| 0),
    }
}

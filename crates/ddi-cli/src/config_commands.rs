//! Configuration management subcommands.
//!
//! Persisted configuration lives in `<home>/.env`; keys are given either
//! by their CLI name (`data-root`) or variable name (`DDI_DATA_ROOT`).

use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the `.env` location and every persisted value
    Show,
    /// Persist a value (data-root, save-root, user-dir, entry-point, python)
    Set {
        /// Key to set
        key: String,
        /// New value; paths are stored absolute
        value: String,
    },
    /// Remove a persisted value
    Unset {
        /// Key to remove
        key: String,
    },
    /// Print the default launch profile as JSON
    ProfileTemplate,
}

//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub fn execute(ctx: &CliContext, ...) -> Result<...>`
//!   (`async` only where a process is launched)
//! - Thin wrappers that:
//!   1. Turn CLI arguments into domain values
//!   2. Call into `ddi-core` / `ddi-runtime`
//!   3. Format output for the terminal
//!
//! Commands that can fail "softly" (`run`, `check`) return the process exit
//! code instead of `()`.

pub mod archs;
pub mod check;
pub mod config;
pub mod paths;
pub mod run;
pub mod show;

//! Paths command handler.
//!
//! Displays every resolved root for diagnostics.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command.
///
/// Prints roots in `key = value (source)` format, followed by the env file
/// and the interpreter (or why it could not be found).
pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("{}", ctx.roots);
    println!("env_file = {}", ctx.env_file.display());
    match ctx.interpreter() {
        Ok(python) => println!("python = {} ({})", python.path.display(), python.source),
        Err(e) => println!("python = <unresolved> ({e})"),
    }
    Ok(())
}

//! Show command handler.
//!
//! Prints exactly what `run` would execute for a fold, without running it.

use anyhow::Result;

use ddi_core::Fold;

use crate::bootstrap::CliContext;
use crate::commands::ProfileArgs;

/// Execute the show command.
///
/// With `json`, prints the launch plan as JSON; otherwise the layout in
/// `key = value` form followed by the shell-quoted command line.
pub fn execute(ctx: &CliContext, fold: &Fold, json: bool, profile: &ProfileArgs) -> Result<()> {
    let launch = ctx.launch_context(&profile.to_overrides(&[]))?;
    let (layout, plan) = launch.plan(fold);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{layout}");
    println!("command:");
    println!("  {}", plan.display_command());
    Ok(())
}

//! Check command handler.

use std::path::PathBuf;

use anyhow::Result;

use ddi_core::Fold;
use ddi_core::paths::PYTHON_ENV;
use ddi_runtime::{LaunchContext, PreflightReport, detect_gpu_count, preflight};
use tracing::warn;

use crate::bootstrap::CliContext;
use crate::commands::ProfileArgs;

/// Exit code when a required item is missing (sysexits `EX_NOINPUT`).
pub const MISSING_ITEMS_EXIT: i32 = 66;

/// Execute the check command; returns the process exit code.
///
/// An interpreter that cannot be resolved is reported as a missing item
/// rather than aborting, so the report is always complete.
pub fn execute(ctx: &CliContext, fold: &Fold, profile: &ProfileArgs) -> Result<i32> {
    let profile = ctx.profile(&profile.to_overrides(&[]))?;
    let interpreter: PathBuf = match ctx.interpreter() {
        Ok(found) => found.path,
        Err(e) => {
            warn!("{e}");
            ctx.config
                .python
                .clone()
                .or_else(|| std::env::var(PYTHON_ENV).ok())
                .unwrap_or_else(|| "python3".to_string())
                .into()
        }
    };
    let launch = LaunchContext::new(interpreter, ctx.roots.clone(), profile);
    let layout = launch.layout(fold);

    let report = preflight(&launch, &layout, gpu_count_for(&launch));
    println!("{report}");

    Ok(exit_code(&report))
}

/// Probe GPUs only when the profile asks for any.
pub(crate) fn gpu_count_for(launch: &LaunchContext) -> Option<u32> {
    if launch.profile.device.indices().is_empty() {
        None
    } else {
        detect_gpu_count()
    }
}

fn exit_code(report: &PreflightReport) -> i32 {
    if report.has_failures() {
        MISSING_ITEMS_EXIT
    } else {
        0
    }
}

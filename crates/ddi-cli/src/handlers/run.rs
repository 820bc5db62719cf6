//! Run command handler.
//!
//! Launches one inference process per fold and forwards the exit status.

use std::sync::Arc;

use anyhow::Result;

use ddi_runtime::{
    FoldResult, InferenceSession, OutputMode, ProcessLauncher, SessionError, cancel_on_ctrl_c,
    check_folds, preflight,
};
use tracing::{info, warn};

use crate::bootstrap::CliContext;
use crate::commands::RunArgs;
use crate::error::CliError;
use crate::handlers::check::gpu_count_for;

/// Execute the run command; returns the exit code to leave with.
///
/// The code is the first failing fold's own exit status, 130 after an
/// interrupt, or 0. Preflight problems are logged as warnings only; the
/// entry point reports missing data or checkpoints itself.
pub async fn execute(ctx: &CliContext, args: RunArgs) -> Result<i32> {
    check_folds(&args.folds).map_err(CliError::from)?;
    let launch = ctx.launch_context(&args.profile.to_overrides(&args.extra))?;

    if args.dry_run {
        for fold in &args.folds {
            let (_, plan) = launch.plan(fold);
            println!("{}", plan.display_command());
        }
        return Ok(0);
    }

    let gpu_count = gpu_count_for(&launch);
    for fold in &args.folds {
        let layout = launch.layout(fold);
        for item in preflight(&launch, &layout, gpu_count).problems() {
            warn!(
                %fold,
                item = item.name,
                status = %item.status,
                note = item.note.as_deref().unwrap_or(""),
                "{}",
                item.detail
            );
        }
    }

    let output = if args.capture_output {
        OutputMode::Capture
    } else {
        OutputMode::Inherit
    };
    let cancel = cancel_on_ctrl_c();
    let launcher = ProcessLauncher::new()
        .with_output(output)
        .with_cancel_token(cancel.clone())
        .without_ctrl_c();
    let session =
        InferenceSession::new(Arc::new(launcher), launch).with_cancel_token(cancel.clone());

    let result = session.run(&args.folds, args.keep_going).await;
    // Releases the Ctrl+C listener
    cancel.cancel();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            if let SessionError::Launch { completed, .. } = &err {
                log_summary(completed);
            }
            return Err(CliError::from(err).into());
        }
    };

    if report.results.len() > 1 || !report.skipped.is_empty() {
        log_summary(&report.results);
        for fold in &report.skipped {
            warn!(%fold, "Fold skipped");
        }
    }

    Ok(report.exit_code())
}

fn log_summary(results: &[FoldResult]) {
    for result in results {
        info!(
            fold = %result.fold,
            exit_code = result.outcome.exit_code(),
            elapsed_secs = result.outcome.duration.as_secs_f64(),
            "Fold summary"
        );
    }
}

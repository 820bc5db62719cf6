//! Multi-fold inference sessions.
//!
//! A session owns everything that stays the same across folds (interpreter,
//! roots, profile) and runs one child process per fold, strictly one after
//! another.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use ddi_core::{
    Fold, InferenceProfile, LaunchError, LaunchOutcome, LaunchPlan, Launcher, ResolvedRoots,
    RunLayout,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::command::InferenceCommandBuilder;

/// Exit code of a session cancelled between folds (as for SIGINT).
const INTERRUPTED_EXIT: i32 = 130;

/// Errors that abort a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No folds given")]
    NoFolds,

    #[error("Fold '{0}' given more than once")]
    DuplicateFold(Fold),

    #[error("Fold '{fold}': {source}")]
    Launch {
        fold: Fold,
        #[source]
        source: LaunchError,
        /// Folds that finished before the failing launch.
        completed: Vec<FoldResult>,
    },
}

/// Inputs shared by every fold of a session.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub interpreter: PathBuf,
    pub roots: ResolvedRoots,
    pub profile: InferenceProfile,
    pub working_dir: Option<PathBuf>,
}

impl LaunchContext {
    pub fn new(interpreter: impl Into<PathBuf>, roots: ResolvedRoots, profile: InferenceProfile) -> Self {
        Self {
            interpreter: interpreter.into(),
            roots,
            profile,
            working_dir: None,
        }
    }

    pub fn layout(&self, fold: &Fold) -> RunLayout {
        RunLayout::derive(
            self.roots.data_root(),
            self.roots.save_root(),
            &self.profile,
            fold,
        )
    }

    /// Layout and fully-resolved command for one fold.
    pub fn plan(&self, fold: &Fold) -> (RunLayout, LaunchPlan) {
        let layout = self.layout(fold);
        let mut builder = InferenceCommandBuilder::new(
            &self.interpreter,
            self.roots.entry_point(),
            &layout,
        )
        .profile(&self.profile)
        .user_dir(self.roots.user_dir());
        if let Some(dir) = &self.working_dir {
            builder = builder.working_dir(dir);
        }
        let plan = builder.build();
        (layout, plan)
    }
}

/// Result of one fold.
#[derive(Debug, Clone)]
pub struct FoldResult {
    pub fold: Fold,
    pub outcome: LaunchOutcome,
}

/// Summary of a session run.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub results: Vec<FoldResult>,
    /// Folds never started because an earlier one failed or was interrupted.
    pub skipped: Vec<Fold>,
    /// Cancelled between two folds, with no child running.
    pub interrupted: bool,
}

impl SessionReport {
    pub fn success(&self) -> bool {
        self.skipped.is_empty() && self.results.iter().all(|r| r.outcome.success())
    }

    /// The first failing fold's code; 130 when cancelled between folds
    /// after all finished ones succeeded; otherwise 0.
    pub fn exit_code(&self) -> i32 {
        self.results
            .iter()
            .map(|r| &r.outcome)
            .find(|o| !o.success())
            .map_or(
                if self.interrupted { INTERRUPTED_EXIT } else { 0 },
                LaunchOutcome::exit_code,
            )
    }

    pub fn failed(&self) -> impl Iterator<Item = &FoldResult> {
        self.results.iter().filter(|r| !r.outcome.success())
    }
}

/// Runs folds through a [`Launcher`].
pub struct InferenceSession {
    launcher: Arc<dyn Launcher>,
    context: LaunchContext,
    cancel: Option<CancellationToken>,
}

impl InferenceSession {
    pub fn new(launcher: Arc<dyn Launcher>, context: LaunchContext) -> Self {
        Self {
            launcher,
            context,
            cancel: None,
        }
    }

    /// Start no further folds once `token` is cancelled.
    ///
    /// Hand the same token to the launcher so a running child is stopped too.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn context(&self) -> &LaunchContext {
        &self.context
    }

    pub fn plan(&self, fold: &Fold) -> (RunLayout, LaunchPlan) {
        self.context.plan(fold)
    }

    /// Run `folds` in order.
    ///
    /// A failing fold stops the session unless `keep_going` is set; an
    /// interrupted fold always stops it. Folds that never ran are listed in
    /// [`SessionReport::skipped`].
    pub async fn run(&self, folds: &[Fold], keep_going: bool) -> Result<SessionReport, SessionError> {
        check_folds(folds)?;

        let mut report = SessionReport::default();
        for (index, fold) in folds.iter().enumerate() {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                warn!(%fold, "Cancelled before fold started");
                report.interrupted = true;
                report.skipped = folds[index..].to_vec();
                break;
            }

            let (_, plan) = self.plan(fold);
            let span = info_span!("fold", fold = %fold);

            let outcome = match self.launcher.launch(&plan).instrument(span).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    return Err(SessionError::Launch {
                        fold: fold.clone(),
                        source,
                        completed: report.results,
                    });
                }
            };

            let stop = outcome.interrupted || (!outcome.success() && !keep_going);
            if outcome.success() {
                info!(%fold, "Fold finished");
            } else {
                warn!(%fold, exit_code = outcome.exit_code(), "Fold failed");
            }
            report.results.push(FoldResult {
                fold: fold.clone(),
                outcome,
            });

            if stop {
                report.skipped = folds[index + 1..].to_vec();
                break;
            }
        }
        Ok(report)
    }
}

/// Reject an empty or repeated fold list before anything is launched.
pub fn check_folds(folds: &[Fold]) -> Result<(), SessionError> {
    if folds.is_empty() {
        return Err(SessionError::NoFolds);
    }
    let mut seen = HashSet::with_capacity(folds.len());
    for fold in folds {
        if !seen.insert(fold) {
            return Err(SessionError::DuplicateFold(fold.clone()));
        }
    }
    Ok(())
}

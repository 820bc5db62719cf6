//! Session behavior against a mocked launcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ddi_core::{Fold, InferenceProfile, LaunchError, LaunchOutcome, LaunchPlan, Launcher, ResolvedRoots};
use ddi_runtime::{InferenceSession, LaunchContext, SessionError, check_folds};
use mockall::{Sequence, mock};
use tokio_util::sync::CancellationToken;

mock! {
    pub FoldLauncher {}

    #[async_trait]
    impl Launcher for FoldLauncher {
        async fn launch(&self, plan: &LaunchPlan) -> Result<LaunchOutcome, LaunchError>;
    }
}

fn folds(names: &[&str]) -> Vec<Fold> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

fn session(launcher: MockFoldLauncher) -> InferenceSession {
    let context = LaunchContext::new(
        "/usr/bin/python3",
        ResolvedRoots::under("/srv/ddi"),
        InferenceProfile::default(),
    );
    InferenceSession::new(Arc::new(launcher), context)
}

fn data_dir_is(plan: &LaunchPlan, fold: &str) -> bool {
    plan.args.get(1).is_some_and(|dir| *dir == format!("/srv/ddi/data/{fold}/data-bin"))
}

fn exited(code: i32) -> LaunchOutcome {
    LaunchOutcome::exited(code, Duration::from_millis(5))
}

#[tokio::test]
async fn folds_run_in_order() {
    let mut launcher = MockFoldLauncher::new();
    let mut seq = Sequence::new();
    for name in ["fold0", "fold1", "fold2"] {
        launcher
            .expect_launch()
            .withf(move |plan| data_dir_is(plan, name))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(exited(0)));
    }

    let report = session(launcher)
        .run(&folds(&["fold0", "fold1", "fold2"]), false)
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.results.len(), 3);
}

#[tokio::test]
async fn failure_stops_remaining_folds() {
    let mut launcher = MockFoldLauncher::new();
    launcher
        .expect_launch()
        .times(1)
        .returning(|_| Ok(exited(3)));

    let report = session(launcher)
        .run(&folds(&["fold0", "fold1"]), false)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 3);
    assert_eq!(report.skipped, folds(&["fold1"]));
}

#[tokio::test]
async fn keep_going_runs_every_fold_and_reports_first_failure() {
    let mut launcher = MockFoldLauncher::new();
    launcher
        .expect_launch()
        .withf(|plan| data_dir_is(plan, "fold0"))
        .returning(|_| Ok(exited(2)));
    launcher
        .expect_launch()
        .withf(|plan| data_dir_is(plan, "fold1"))
        .returning(|_| Ok(exited(0)));
    launcher
        .expect_launch()
        .withf(|plan| data_dir_is(plan, "fold2"))
        .returning(|_| Ok(exited(5)));

    let report = session(launcher)
        .run(&folds(&["fold0", "fold1", "fold2"]), true)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.exit_code(), 2);
    assert_eq!(report.failed().count(), 2);
}

#[tokio::test]
async fn interruption_stops_even_with_keep_going() {
    let mut launcher = MockFoldLauncher::new();
    launcher.expect_launch().times(1).returning(|_| {
        Ok(LaunchOutcome {
            code: None,
            signal: Some(15),
            interrupted: true,
            duration: Duration::from_secs(1),
        })
    });

    let report = session(launcher)
        .run(&folds(&["fold0", "fold1"]), true)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 143);
    assert_eq!(report.skipped.len(), 1);
}

#[tokio::test]
async fn duplicate_folds_launch_nothing() {
    let mut launcher = MockFoldLauncher::new();
    launcher.expect_launch().never();

    let err = session(launcher)
        .run(&folds(&["fold0", "fold0"]), false)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::DuplicateFold(_)));
}

#[tokio::test]
async fn spawn_failure_is_an_error() {
    let mut launcher = MockFoldLauncher::new();
    launcher.expect_launch().times(1).returning(|plan| {
        Err(LaunchError::Spawn {
            program: plan.program.clone(),
            reason: "No such file or directory".to_string(),
        })
    });

    let err = session(launcher)
        .run(&folds(&["fold0", "fold1"]), true)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Launch { ref fold, .. } if fold.as_str() == "fold0"));
}

#[tokio::test]
async fn spawn_failure_keeps_finished_folds() {
    let mut launcher = MockFoldLauncher::new();
    let mut seq = Sequence::new();
    launcher
        .expect_launch()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(exited(0)));
    launcher
        .expect_launch()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|plan| {
            Err(LaunchError::Spawn {
                program: plan.program.clone(),
                reason: "Permission denied".to_string(),
            })
        });

    let err = session(launcher)
        .run(&folds(&["fold0", "fold1", "fold2"]), true)
        .await
        .unwrap_err();

    let SessionError::Launch { fold, completed, .. } = err else {
        panic!("expected a launch error");
    };
    assert_eq!(fold.as_str(), "fold1");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].fold.as_str(), "fold0");
    assert!(completed[0].outcome.success());
}

#[tokio::test]
async fn cancelled_token_launches_nothing() {
    let mut launcher = MockFoldLauncher::new();
    launcher.expect_launch().never();
    let token = CancellationToken::new();
    token.cancel();

    let report = session(launcher)
        .with_cancel_token(token)
        .run(&folds(&["fold0", "fold1"]), false)
        .await
        .unwrap();

    assert!(report.interrupted);
    assert!(report.results.is_empty());
    assert_eq!(report.skipped, folds(&["fold0", "fold1"]));
    assert_eq!(report.exit_code(), 130);
}

#[tokio::test]
async fn cancellation_after_a_fold_skips_the_rest() {
    let token = CancellationToken::new();
    let cancel_during_fold = token.clone();

    let mut launcher = MockFoldLauncher::new();
    launcher.expect_launch().times(1).returning(move |_| {
        // Ctrl+C arrives just as the child exits cleanly
        cancel_during_fold.cancel();
        Ok(exited(0))
    });

    let report = session(launcher)
        .with_cancel_token(token)
        .run(&folds(&["fold0", "fold1", "fold2"]), true)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.skipped, folds(&["fold1", "fold2"]));
    assert_eq!(report.exit_code(), 130);
}

#[test]
fn repeated_folds_are_rejected_without_a_session() {
    assert!(matches!(
        check_folds(&folds(&["fold0", "fold0"])),
        Err(SessionError::DuplicateFold(_))
    ));
    assert!(check_folds(&folds(&["fold0", "fold1"])).is_ok());
}

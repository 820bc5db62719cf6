//! Process launcher implementation.
//!
//! `ProcessLauncher` implements the [`Launcher`] port with a real child
//! process. It waits for the child while watching for Ctrl+C and an
//! optional cancellation token; an interrupted child is stopped through
//! [`shutdown_child`] before the outcome is reported.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ddi_core::{LaunchError, LaunchOutcome, LaunchPlan, Launcher};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};

use crate::process::{SHUTDOWN_GRACE, shutdown_child};

/// How long to keep draining captured output after the child is gone.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Child writes straight to this terminal.
    #[default]
    Inherit,
    /// Each output line is re-emitted through `tracing`.
    Capture,
}

/// Launches plans as child processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    output: OutputMode,
    cancel: Option<CancellationToken>,
    handle_ctrl_c: bool,
    grace: Duration,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self {
            output: OutputMode::default(),
            cancel: None,
            handle_ctrl_c: true,
            grace: SHUTDOWN_GRACE,
        }
    }
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Stop the child when this token is cancelled.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Do not install a Ctrl+C handler (embedders that own signals).
    pub fn without_ctrl_c(mut self) -> Self {
        self.handle_ctrl_c = false;
        self
    }

    /// Grace period between SIGTERM and SIGKILL.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    fn command(&self, plan: &LaunchPlan) -> Command {
        let mut cmd = Command::new(&plan.program);
        cmd.args(plan.os_args())
            .envs(plan.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);

        if let Some(dir) = &plan.working_dir {
            cmd.current_dir(dir);
        }

        if self.output == OutputMode::Capture {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        cmd
    }
}

enum Stop {
    Exited(std::io::Result<ExitStatus>),
    Interrupted(&'static str),
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, plan: &LaunchPlan) -> Result<LaunchOutcome, LaunchError> {
        debug!(command = %plan.display_command(), "Spawning inference process");

        let started = Instant::now();
        let mut child = self.command(plan).spawn().map_err(|e| LaunchError::Spawn {
            program: plan.program.clone(),
            reason: e.to_string(),
        })?;
        info!(pid = child.id(), "Inference process started");

        let readers = if self.output == OutputMode::Capture {
            spawn_log_readers(&mut child)
        } else {
            Vec::new()
        };

        let handle_ctrl_c = self.handle_ctrl_c;
        let cancel = self.cancel.clone();

        let stop = tokio::select! {
            status = child.wait() => Stop::Exited(status),

            () = async {
                match cancel {
                    Some(ref token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            } => Stop::Interrupted("cancelled"),

            () = async {
                if handle_ctrl_c && signal::ctrl_c().await.is_ok() {
                    return;
                }
                std::future::pending::<()>().await;
            } => Stop::Interrupted("ctrl-c"),
        };

        let (status, interrupted) = match stop {
            Stop::Exited(status) => (status.map_err(|e| LaunchError::Wait(e.to_string()))?, false),
            Stop::Interrupted(reason) => {
                warn!(reason, "Interrupted, stopping inference process");
                let status = shutdown_child(&mut child, self.grace)
                    .await
                    .map_err(|e| LaunchError::Shutdown(e.to_string()))?;
                (status, true)
            }
        };

        for reader in readers {
            if tokio::time::timeout(DRAIN_TIMEOUT, reader).await.is_err() {
                debug!("Output reader still open after exit, detaching");
            }
        }

        let outcome = LaunchOutcome {
            code: status.code(),
            signal: exit_signal(status),
            interrupted,
            duration: started.elapsed(),
        };
        info!(
            exit_code = outcome.exit_code(),
            elapsed_secs = outcome.duration.as_secs_f64(),
            "Inference process finished"
        );
        Ok(outcome)
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Spawn background tasks that re-emit stdout/stderr lines via tracing.
///
/// Tasks inherit the caller's span, so lines carry the fold being run.
fn spawn_log_readers(child: &mut Child) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        handles.push(forward_lines(stdout, "stdout"));
    }
    if let Some(stderr) = child.stderr.take() {
        handles.push(forward_lines(stderr, "stderr"));
    }
    handles
}

fn forward_lines<R>(reader: R, stream: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(
        async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(text)) = lines.next_line().await {
                info!(stream, "{text}");
            }
        }
        .instrument(Span::current()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn sh(script: &str) -> LaunchPlan {
        let mut plan = LaunchPlan::new("/bin/sh");
        plan.args = vec!["-c".to_string(), script.to_string()];
        plan
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn exit_code_is_reported() {
        let launcher = ProcessLauncher::new().without_ctrl_c();
        let outcome = launcher.launch(&sh("exit 3")).await.unwrap();
        assert_eq!(outcome.code, Some(3));
        assert_eq!(outcome.exit_code(), 3);
        assert!(!outcome.interrupted);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn plan_env_reaches_child() {
        let mut plan = sh(r#"test "$CUDA_VISIBLE_DEVICES" = "2""#);
        plan.envs
            .push(("CUDA_VISIBLE_DEVICES".to_string(), "2".to_string()));

        let launcher = ProcessLauncher::new()
            .with_output(OutputMode::Capture)
            .without_ctrl_c();
        let outcome = launcher.launch(&plan).await.unwrap();
        assert!(outcome.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn cancellation_stops_child() {
        let token = CancellationToken::new();
        let launcher = ProcessLauncher::new()
            .with_cancel_token(token.clone())
            .with_shutdown_grace(Duration::from_secs(1))
            .without_ctrl_c();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let outcome = launcher.launch(&sh("sleep 30")).await.unwrap();
        canceller.await.unwrap();

        assert!(outcome.interrupted);
        assert!(!outcome.success());
        assert_eq!(outcome.signal, Some(15));
        assert_eq!(outcome.exit_code(), 143);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let plan = LaunchPlan::new("/nonexistent/ddi-python");
        let err = ProcessLauncher::new()
            .without_ctrl_c()
            .launch(&plan)
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }
}

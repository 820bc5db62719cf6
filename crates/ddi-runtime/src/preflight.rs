//! Pre-launch checks.
//!
//! Preflight never blocks a launch by itself: the toolkit owns the real
//! failure modes. The report is printed by `check` and turned into
//! warnings by `run`.

use std::fmt;
use std::path::Path;

use ddi_core::{DeviceSelection, RunLayout};

use crate::interpreter::{InterpreterError, validate_executable};
use crate::session::LaunchContext;

/// State of one checked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Missing,
    /// Present but likely wrong.
    Warning,
    /// Could not be determined.
    Unknown,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Missing => "MISSING",
            Self::Warning => "WARN",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightItem {
    pub name: &'static str,
    pub detail: String,
    pub status: CheckStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub items: Vec<PreflightItem>,
}

impl PreflightReport {
    /// Whether any required item is missing.
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|i| i.status == CheckStatus::Missing)
    }

    /// Items that are not plainly ok.
    pub fn problems(&self) -> impl Iterator<Item = &PreflightItem> {
        self.items.iter().filter(|i| i.status != CheckStatus::Ok)
    }

    pub fn get(&self, name: &str) -> Option<&PreflightItem> {
        self.items.iter().find(|i| i.name == name)
    }

    fn push(&mut self, name: &'static str, detail: impl Into<String>, status: CheckStatus) {
        self.items.push(PreflightItem {
            name,
            detail: detail.into(),
            status,
            note: None,
        });
    }

    fn push_path(&mut self, name: &'static str, path: &Path, present: bool) {
        let status = if present {
            CheckStatus::Ok
        } else {
            CheckStatus::Missing
        };
        self.push(name, path.display().to_string(), status);
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{:>7}] {:<12} {}", item.status, item.name, item.detail)?;
            if let Some(note) = &item.note {
                write!(f, " ({note})")?;
            }
        }
        Ok(())
    }
}

/// Check everything one fold needs.
///
/// `gpu_count` is the detected device count (see
/// [`detect_gpu_count`](crate::gpu::detect_gpu_count)); `None` means unknown.
pub fn preflight(context: &LaunchContext, layout: &RunLayout, gpu_count: Option<u32>) -> PreflightReport {
    let mut report = PreflightReport::default();

    check_interpreter(&mut report, &context.interpreter);
    report.push_path(
        "entry point",
        context.roots.entry_point(),
        context.roots.entry_point().is_file(),
    );
    report.push_path(
        "user dir",
        context.roots.user_dir(),
        context.roots.user_dir().is_dir(),
    );
    report.push_path("data dir", &layout.data_dir, layout.data_dir.is_dir());
    report.push_path(
        "checkpoint",
        &layout.checkpoint_path,
        layout.checkpoint_path.is_file(),
    );
    check_devices(&mut report, &context.profile.device, gpu_count);

    report
}

fn check_interpreter(report: &mut PreflightReport, interpreter: &Path) {
    let (status, note) = match validate_executable(interpreter) {
        Ok(()) => (CheckStatus::Ok, None),
        Err(InterpreterError::NotExecutable { .. }) => {
            (CheckStatus::Missing, Some("not executable".to_string()))
        }
        Err(_) => (CheckStatus::Missing, None),
    };
    report.items.push(PreflightItem {
        name: "interpreter",
        detail: interpreter.display().to_string(),
        status,
        note,
    });
}

fn check_devices(report: &mut PreflightReport, device: &DeviceSelection, gpu_count: Option<u32>) {
    let detail = match device {
        DeviceSelection::None => "none (CPU only)".to_string(),
        DeviceSelection::Gpus(_) => format!("CUDA_VISIBLE_DEVICES={}", device.env_value()),
    };

    let (status, note) = match (device.indices(), gpu_count) {
        ([], _) => (CheckStatus::Ok, None),
        (_, None) => (CheckStatus::Unknown, Some("nvidia-smi unavailable".to_string())),
        (ids, Some(count)) => match ids.iter().find(|&&id| id >= count) {
            Some(id) => (
                CheckStatus::Warning,
                Some(format!("GPU {id} requested, {count} detected")),
            ),
            None => (CheckStatus::Ok, Some(format!("{count} detected"))),
        },
    };

    report.items.push(PreflightItem {
        name: "devices",
        detail,
        status,
        note,
    });
}

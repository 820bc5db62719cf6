//! NVIDIA GPU detection.

use std::process::Command;

use tracing::debug;

/// Number of NVIDIA GPUs reported by `nvidia-smi --list-gpus`.
///
/// Returns `None` when `nvidia-smi` is missing or fails, which usually
/// means no driver is installed; callers treat that as "unknown".
pub fn detect_gpu_count() -> Option<u32> {
    let output = Command::new("nvidia-smi").arg("--list-gpus").output().ok()?;
    if !output.status.success() {
        debug!(status = %output.status, "nvidia-smi failed");
        return None;
    }
    let count = count_listed_gpus(&String::from_utf8_lossy(&output.stdout));
    debug!(count, "Detected NVIDIA GPUs");
    Some(count)
}

/// Count `GPU <n>: ...` lines in `nvidia-smi --list-gpus` output.
fn count_listed_gpus(stdout: &str) -> u32 {
    let count = stdout
        .lines()
        .filter(|line| line.trim_start().starts_with("GPU "))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

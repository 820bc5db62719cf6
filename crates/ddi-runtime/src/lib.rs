//! Process runtime and OS-level concerns for `ddi-infer`.
//!
//! Everything here touches the operating system: locating the Python
//! interpreter, turning a profile into a command line, spawning and
//! supervising the inference process, probing GPUs and checking the
//! filesystem before a launch.

#![deny(unsafe_code)]

pub mod command;
pub mod gpu;
pub mod interpreter;
pub mod preflight;
pub mod process;
mod runner;
pub mod session;

pub use command::{CUDA_VISIBLE_DEVICES, InferenceCommandBuilder};
pub use gpu::detect_gpu_count;
pub use interpreter::{Interpreter, InterpreterError, InterpreterSource, resolve_interpreter};
pub use preflight::{CheckStatus, PreflightItem, PreflightReport, preflight};
pub use runner::{OutputMode, ProcessLauncher};
pub use process::cancel_on_ctrl_c;
pub use session::{
    FoldResult, InferenceSession, LaunchContext, SessionError, SessionReport, check_folds,
};

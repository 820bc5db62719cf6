//! Domain types for the inference launcher.

mod architecture;
mod fold;
mod head;
mod options;

pub use architecture::{Architecture, GcnConfig, MODEL_FAMILY};
pub use fold::{Fold, FoldError, check_path_component};
pub use head::ClassificationHead;
pub use options::{DdpBackend, DeviceError, DeviceSelection, GnnNorm, Precision};

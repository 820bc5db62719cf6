//! Core domain types and port definitions for `ddi-infer`.
//!
//! `ddi-infer` launches the drug-drug-interaction toolkit's binary
//! classification inference entry point for one or more data folds. This
//! crate holds everything that can be decided without touching a process:
//!
//! - [`domain`]: fold names, the `drug_gcn` architecture registry,
//!   classification heads and enumerated launch options
//! - [`profile`]: the fixed flag set passed to the entry point
//! - [`layout`]: per-fold data / checkpoint path derivation
//! - [`paths`]: root resolution and `.env` persistence
//! - [`ports`]: the [`Launcher`](ports::Launcher) trait implemented by
//!   `ddi-runtime`

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod layout;
pub mod paths;
pub mod ports;
pub mod profile;

// Re-export commonly used types for convenience
pub use domain::{
    Architecture, ClassificationHead, DdpBackend, DeviceError, DeviceSelection, Fold, FoldError,
    GcnConfig, GnnNorm, MODEL_FAMILY, Precision, check_path_component,
};
pub use layout::{DATA_BIN_DIR, RunLayout};
pub use paths::{PathError, ResolvedRoots, RootOverrides};
pub use ports::{LaunchError, LaunchOutcome, LaunchPlan, Launcher};
pub use profile::{InferenceProfile, ProfileError, ProfileOverrides};

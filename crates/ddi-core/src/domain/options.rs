//! Small enumerated launch options: normalization, precision, DDP backend
//! and the GPU device selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Normalization layer used inside the GNN blocks (`--gnn-norm`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GnnNorm {
    Batch,
    Layer,
    Instance,
}

/// Numeric precision mode of the inference run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Precision {
    Fp32,
    #[default]
    Fp16,
    Bf16,
}

impl Precision {
    /// Toolkit flag enabling this mode; full precision has none.
    pub const fn flag(self) -> Option<&'static str> {
        match self {
            Self::Fp32 => None,
            Self::Fp16 => Some("--fp16"),
            Self::Bf16 => Some("--bf16"),
        }
    }
}

/// Distributed data-parallel backend (`--ddp-backend`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DdpBackend {
    #[default]
    LegacyDdp,
    C10d,
    NoC10d,
    FullySharded,
}

/// Invalid `CUDA_VISIBLE_DEVICES` selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Invalid GPU index '{0}' (expected a non-negative integer)")]
    InvalidIndex(String),

    #[error("GPU index {0} listed more than once")]
    Duplicate(u32),
}

/// Which accelerators the launched process may see.
///
/// Rendered as the value of `CUDA_VISIBLE_DEVICES`: a comma-separated
/// index list, or the empty string to hide every device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceSelection {
    /// No accelerator visible (CPU only).
    None,
    /// Ordered GPU indices.
    Gpus(Vec<u32>),
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self::Gpus(vec![0])
    }
}

impl DeviceSelection {
    /// Value for the `CUDA_VISIBLE_DEVICES` environment variable.
    pub fn env_value(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Gpus(ids) => ids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Selected GPU indices (empty for [`DeviceSelection::None`]).
    pub fn indices(&self) -> &[u32] {
        match self {
            Self::None => &[],
            Self::Gpus(ids) => ids,
        }
    }
}

impl FromStr for DeviceSelection {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed == "cpu" {
            return Ok(Self::None);
        }

        let mut ids = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            let id: u32 = part
                .parse()
                .map_err(|_| DeviceError::InvalidIndex(part.to_string()))?;
            if ids.contains(&id) {
                return Err(DeviceError::Duplicate(id));
            }
            ids.push(id);
        }

        Ok(Self::Gpus(ids))
    }
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Gpus(_) => f.write_str(&self.env_value()),
        }
    }
}

impl TryFrom<String> for DeviceSelection {
    type Error = DeviceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceSelection> for String {
    fn from(selection: DeviceSelection) -> Self {
        selection.to_string()
    }
}

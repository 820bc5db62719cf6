//! Registered `drug_gcn` model architectures and their defaults.
//!
//! The external toolkit registers one model family (`drug_gcn`) under
//! several architecture names that differ only in depth. The launcher
//! never builds the model; it needs the names to validate `--arch` and the
//! defaults to describe what each name means.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::options::GnnNorm;

/// Model family name shared by every architecture below.
pub const MODEL_FAMILY: &str = "drug_gcn";

/// Registered architecture names.
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
    AsRefStr,
    IntoStaticStr,
)]
pub enum Architecture {
    #[serde(rename = "drug_gcn_tiny")]
    #[strum(serialize = "drug_gcn_tiny")]
    DrugGcnTiny,

    #[serde(rename = "drug_gcn_base")]
    #[strum(serialize = "drug_gcn_base")]
    DrugGcnBase,

    #[default]
    #[serde(rename = "drug_gcn_large")]
    #[strum(serialize = "drug_gcn_large")]
    DrugGcnLarge,
}

impl Architecture {
    /// All registered architectures, smallest first.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Registry name passed as `--arch`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Default number of GNN layers.
    pub const fn gnn_number_layer(self) -> u32 {
        match self {
            Self::DrugGcnTiny => 2,
            Self::DrugGcnBase => 6,
            Self::DrugGcnLarge => 12,
        }
    }

    /// Default GNN embedding dimension.
    pub const fn gnn_embed_dim(self) -> u32 {
        384
    }
}

/// Hyper-parameter defaults of the `drug_gcn` model family.
///
/// These mirror the model's configuration dataclass; values are only
/// reported (and used for validation), never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcnConfig {
    pub dropout: f32,
    pub max_positions: u32,
    pub gnn_number_layer: u32,
    pub gnn_dropout: f32,
    pub conv_encode_edge: bool,
    pub gnn_embed_dim: u32,
    pub gnn_aggr: String,
    pub gnn_norm: GnnNorm,
    pub gnn_activation_fn: String,
    pub pooler_activation_fn: String,
    pub pooler_dropout: f32,
    pub num_base_vector: u32,
    pub vector_group_size: u32,
    pub basic_vector_size: u32,
    pub code_dim: u32,
    pub dict_size: u32,
    pub num_head: u32,
}

impl Default for GcnConfig {
    fn default() -> Self {
        Self {
            dropout: 0.1,
            max_positions: 512,
            gnn_number_layer: 12,
            gnn_dropout: 0.1,
            conv_encode_edge: true,
            gnn_embed_dim: 384,
            gnn_aggr: "maxminmean".to_string(),
            gnn_norm: GnnNorm::Batch,
            gnn_activation_fn: "relu".to_string(),
            pooler_activation_fn: "tanh".to_string(),
            pooler_dropout: 0.0,
            num_base_vector: 30,
            vector_group_size: 5,
            basic_vector_size: 3,
            code_dim: 64,
            dict_size: 200,
            num_head: 8,
        }
    }
}

impl GcnConfig {
    /// Defaults with the architecture's depth and width applied.
    pub fn for_architecture(arch: Architecture) -> Self {
        Self {
            gnn_number_layer: arch.gnn_number_layer(),
            gnn_embed_dim: arch.gnn_embed_dim(),
            ..Self::default()
        }
    }
}

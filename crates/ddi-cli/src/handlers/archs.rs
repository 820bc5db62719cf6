//! Architectures command handler.

use anyhow::Result;

use ddi_core::{Architecture, ClassificationHead, GcnConfig, InferenceProfile, MODEL_FAMILY};

/// List registered architectures with their GNN shape, then the heads.
pub fn execute() -> Result<()> {
    let defaults = InferenceProfile::default();

    println!("Architectures ({MODEL_FAMILY} family):");
    println!("  {:<16} {:>7} {:>10}", "NAME", "LAYERS", "EMBED_DIM");
    for arch in Architecture::all() {
        let marker = if arch == defaults.arch { " (default)" } else { "" };
        println!(
            "  {:<16} {:>7} {:>10}{marker}",
            arch.name(),
            arch.gnn_number_layer(),
            arch.gnn_embed_dim()
        );
    }

    let base = GcnConfig::for_architecture(defaults.arch);
    println!();
    println!(
        "Shared defaults: max_positions={} gnn_aggr={} gnn_norm={} num_head={} dropout={}",
        base.max_positions, base.gnn_aggr, base.gnn_norm, base.num_head, base.dropout
    );

    println!();
    println!("Classification heads:");
    for head in ClassificationHead::all() {
        let marker = if head == defaults.classification_head {
            " (default)"
        } else {
            ""
        };
        println!("  {:<16} {}{marker}", head.name(), head.description());
    }
    Ok(())
}

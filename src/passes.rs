//! Passes.

pub mod split_critical_edges;

use crate::cfg::CFGInfo;
use crate::ir::Unit;
use anyhow::{Context, Result};

/// Validate `unit`, split its critical edges, and compute dominators
/// and loops over the result.
pub fn normalize(unit: &mut Unit) -> Result<CFGInfo> {
    unit.validate()
        .context("invalid unit before critical-edge splitting")?;

    if split_critical_edges::run(unit) {
        unit.validate()
            .context("critical-edge splitting produced an invalid unit")?;
    }

    let cfg = CFGInfo::new(unit);
    log::debug!(
        "normalize: {} blocks, {} reachable, {} loops",
        unit.blocks.len(),
        cfg.rpo.len(),
        cfg.loops.len()
    );
    log::trace!("normalize: finished:\n{}\n", unit.display_verbose("| "));
    Ok(cfg)
}

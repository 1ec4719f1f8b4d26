//! Lightweight CFG analyses.
//!
//! Everything here is keyed by block label and computed from scratch;
//! results go stale as soon as the unit's edges change, so recompute
//! after any structural pass.

use crate::entity::{EntityRef, PerEntity};
use crate::ir::{Block, BlockData, Unit};
use smallvec::SmallVec;

pub mod domtree;
pub mod loops;
pub mod postorder;

pub use domtree::{dominates, find_dominators, IdomVector};
pub use loops::{find_back_edges, find_loop_blocks, BackEdgeVector, LoopBlocks};

pub type Succs = SmallVec<[Block; 2]>;

/// Predecessor lists, indexed by block. A block reached by several
/// edges from the same predecessor lists it once per edge.
pub type PredVector = PerEntity<Block, SmallVec<[Block; 4]>>;

/// Successors of `block`, in the order its terminator lists them.
pub fn succs(block: &BlockData) -> Succs {
    let mut ret = SmallVec::new();
    if let Some(term) = block.terminator() {
        term.kind.visit_targets(|target| ret.push(target));
    }
    ret
}

pub fn compute_preds(unit: &Unit) -> PredVector {
    let mut preds = PredVector::with_len(unit.blocks.len());
    for (block, data) in unit.blocks.entries() {
        for succ in succs(data) {
            preds[succ].push(block);
        }
    }
    preds
}

/// Auxiliary analyses of the control-flow graph.
#[derive(Clone, Debug)]
pub struct CFGInfo {
    /// Entry block.
    pub entry: Block,
    /// Reverse-postorder traversal of reachable blocks.
    pub rpo: Vec<Block>,
    /// Position of each block in RPO, if reachable.
    pub rpo_pos: PerEntity<Block, Option<usize>>,
    /// Preds for a given block.
    pub preds: PredVector,
    /// Domtree parents, indexed by block.
    pub idoms: IdomVector,
    /// Edges whose target dominates their source.
    pub back_edges: BackEdgeVector,
    /// Approximate natural-loop membership, keyed by header.
    pub loops: LoopBlocks,
}

impl CFGInfo {
    pub fn new(unit: &Unit) -> CFGInfo {
        let preds = compute_preds(unit);
        let rpo = postorder::sort_blocks(unit);
        let mut rpo_pos = PerEntity::with_len(unit.blocks.len());
        for (pos, &block) in rpo.iter().enumerate() {
            rpo_pos[block] = Some(pos);
        }

        let idoms = domtree::calculate(unit, &preds, &rpo);
        let back_edges = find_back_edges(unit, &rpo, &idoms);
        let loops = find_loop_blocks(unit, &preds, &back_edges);

        log::trace!(
            "CFGInfo: rpo {:?} idoms {:?} back edges {:?}",
            rpo,
            idoms,
            back_edges
        );

        CFGInfo {
            entry: unit.entry,
            rpo,
            rpo_pos,
            preds,
            idoms,
            back_edges,
            loops,
        }
    }

    pub fn is_reachable(&self, block: Block) -> bool {
        self.rpo_pos[block].is_some()
    }

    pub fn dominates(&self, a: Block, b: Block) -> bool {
        debug_assert!(self.is_reachable(a) && self.is_reachable(b));
        domtree::dominates(a, b, &self.idoms)
    }

    pub fn idom(&self, block: Block) -> Option<Block> {
        let idom = self.idoms[block];
        if idom.is_valid() {
            Some(idom)
        } else {
            None
        }
    }

    pub fn is_loop_header(&self, block: Block) -> bool {
        self.loops.contains_key(&block)
    }

    /// Blocks of the loop headed by `header`, header first.
    pub fn loop_blocks(&self, header: Block) -> Option<&[Block]> {
        self.loops.get(&header).map(|blocks| &blocks[..])
    }
}

//! Back-edge detection and natural-loop membership.

use super::{dominates, succs, IdomVector, PredVector};
use crate::entity::PerEntity;
use crate::ir::{Block, Unit};
use fxhash::FxHashMap;
use smallvec::SmallVec;

/// `(tail, head)` pairs for every edge `tail -> head` where `head`
/// dominates `tail`.
pub type BackEdgeVector = Vec<(Block, Block)>;

/// Loop members keyed by header. The header comes first; every other
/// member appears once, in no particular order.
pub type LoopBlocks = FxHashMap<Block, Vec<Block>>;

pub fn find_back_edges(unit: &Unit, rpo: &[Block], idoms: &IdomVector) -> BackEdgeVector {
    let mut back_edges = vec![];

    let mut seen: PerEntity<Block, bool> = PerEntity::with_len(unit.blocks.len());
    for &block in rpo {
        seen[block] = true;
        for succ in succs(&unit.blocks[block]) {
            // A block's dominators all precede it in RPO, so a successor
            // we have not reached yet cannot dominate it.
            if !seen[succ] {
                continue;
            }
            if !dominates(succ, block, idoms) {
                continue;
            }
            log::trace!("back edge: {} -> {}", block, succ);
            back_edges.push((block, succ));
        }
    }

    back_edges
}

/// Flood-fill backwards from the tails of each header's back edges,
/// stopping at the header. Exact for reducible loops; a loop with side
/// entrances may pick up blocks outside it.
pub fn find_loop_blocks(
    unit: &Unit,
    preds: &PredVector,
    back_edges: &[(Block, Block)],
) -> LoopBlocks {
    let mut headers: FxHashMap<Block, SmallVec<[Block; 2]>> = FxHashMap::default();
    for &(tail, head) in back_edges {
        headers.entry(head).or_default().push(tail);
    }

    let fill_blocks = |header: Block, tails: &[Block]| -> Vec<Block> {
        let mut visited: PerEntity<Block, bool> = PerEntity::with_len(unit.blocks.len());
        visited[header] = true;

        let mut blocks = vec![header];
        let mut worklist: Vec<Block> = tails.to_vec();
        while let Some(block) = worklist.pop() {
            if visited[block] {
                continue;
            }
            visited[block] = true;
            worklist.extend(preds[block].iter().copied());
            blocks.push(block);
        }

        blocks
    };

    headers
        .into_iter()
        .map(|(header, tails)| {
            let blocks = fill_blocks(header, &tails[..]);
            log::trace!("loop at {}: {:?}", header, blocks);
            (header, blocks)
        })
        .collect()
}

//! Dominator tree construction and dominance queries.

// This is a worklist variant of the algorithm described in
//
//   A Simple, Fast Dominance Algorithm
//   Keith D. Cooper, Timothy J. Harvey, and Ken Kennedy
//   Department of Computer Science, Rice University, Houston, Texas, USA
//   TR-06-33870
//   https://www.cs.rice.edu/~keith/EMBED/dom.pdf
//
// Blocks are first settled from a worklist ordered by RPO position,
// revisiting only the successors of blocks whose idom moved. That can
// leave a block under a stale ancestor when something above it moves
// later, so the worklist is followed by RPO sweeps over every block,
// which refill the worklist until one sweep changes nothing.

use super::{compute_preds, succs, PredVector};
use crate::entity::{EntityRef, PerEntity};
use crate::ir::{Block, Unit};
use std::collections::BTreeSet;

/// Immediate dominator of each block. The entry and unreachable blocks
/// hold `Block::invalid()`.
pub type IdomVector = PerEntity<Block, Block>;

/// Compute immediate dominators over `rpo`, which must start with the
/// entry and list every reachable block.
pub fn find_dominators(unit: &Unit, rpo: &[Block]) -> IdomVector {
    let preds = compute_preds(unit);
    calculate(unit, &preds, rpo)
}

/// As `find_dominators`, reusing an already computed predecessor table.
pub fn calculate(unit: &Unit, preds: &PredVector, rpo: &[Block]) -> IdomVector {
    assert!(!rpo.is_empty() && rpo[0] == unit.entry);

    let mut rpo_pos: PerEntity<Block, Option<usize>> = PerEntity::with_len(unit.blocks.len());
    for (pos, &block) in rpo.iter().enumerate() {
        rpo_pos[block] = Some(pos);
    }
    let position = |block: Block| -> usize {
        match rpo_pos[block] {
            Some(pos) => pos,
            None => panic!("{} is reachable but missing from RPO", block),
        }
    };

    let mut idom = IdomVector::with_len(unit.blocks.len());
    let mut worklist: BTreeSet<usize> = BTreeSet::new();

    // A valid idom marks a block as processed. The entry points at
    // itself until the end so that every intersection terminates there.
    idom[unit.entry] = unit.entry;
    for succ in succs(&unit.blocks[unit.entry]) {
        worklist.insert(position(succ));
    }

    loop {
        while let Some(pos) = worklist.pop_first() {
            let block = rpo[pos];
            if block == unit.entry {
                continue;
            }

            // There must be at least one processed predecessor, since
            // only processed blocks push their successors.
            let p1 = merge_preds(&preds[block], &idom, &position);
            assert!(
                p1.is_valid(),
                "{} reached the worklist without a processed predecessor",
                block
            );

            if idom[block] != p1 {
                log::trace!("domtree: idom of {} is now {}", block, p1);
                idom[block] = p1;
                for succ in succs(&unit.blocks[block]) {
                    worklist.insert(position(succ));
                }
            }
        }

        for &block in &rpo[1..] {
            let p1 = merge_preds(&preds[block], &idom, &position);
            if idom[block] != p1 {
                log::trace!("domtree: sweep moves idom of {} to {}", block, p1);
                idom[block] = p1;
                for succ in succs(&unit.blocks[block]) {
                    worklist.insert(position(succ));
                }
            }
        }
        if worklist.is_empty() {
            break;
        }
    }

    idom[unit.entry] = Block::invalid();
    idom
}

/// Intersect the dominator chains of the processed blocks in `preds`.
/// Returns `Block::invalid()` if none is processed yet.
fn merge_preds<P: Fn(Block) -> usize>(
    preds: &[Block],
    idom: &IdomVector,
    position: &P,
) -> Block {
    let mut p1 = Block::invalid();
    for &p2 in preds {
        if idom[p2].is_invalid() || p2 == p1 {
            continue;
        }
        if p1.is_invalid() {
            p1 = p2;
            continue;
        }
        p1 = intersect(idom, position, p1, p2);
    }
    p1
}

/// Nearest common ancestor of two processed blocks in the partial
/// dominator tree.
fn intersect<P: Fn(Block) -> usize>(
    idom: &IdomVector,
    position: &P,
    mut p1: Block,
    mut p2: Block,
) -> Block {
    while p1 != p2 {
        while position(p1) < position(p2) {
            p2 = idom[p2];
        }
        while position(p2) < position(p1) {
            p1 = idom[p1];
        }
    }
    p1
}

/// Does `b1` dominate `b2`? Every block dominates itself. Both blocks
/// must be reachable.
pub fn dominates(b1: Block, b2: Block, idoms: &IdomVector) -> bool {
    debug_assert!(b1.is_valid() && b2.is_valid());
    let mut b = b2;
    while b.is_valid() {
        if b == b1 {
            return true;
        }
        b = idoms[b];
    }
    false
}

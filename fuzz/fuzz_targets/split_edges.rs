//! Fuzzing critical-edge splitting and the CFG analyses.
//!
//! 1. Generate a unit with an arbitrary CFG.
//! 2. Split its critical edges, checking that none remain and that a
//!    second run changes nothing.
//! 3. Check dominance against dominator sets computed the slow way,
//!    and loop results for internal consistency.

#![no_main]
use libfuzzer_sys::fuzz_target;
use lircfg::cfg::{compute_preds, succs, CFGInfo};
use lircfg::entity::PerEntity;
use lircfg::fuzzing::ArbitraryCfg;
use lircfg::passes::split_critical_edges;
use lircfg::{Block, Unit};
use std::collections::BTreeSet;

fn set_dominators(unit: &Unit, rpo: &[Block]) -> PerEntity<Block, BTreeSet<Block>> {
    let preds = compute_preds(unit);
    let reachable: BTreeSet<Block> = rpo.iter().cloned().collect();
    let mut doms: PerEntity<Block, BTreeSet<Block>> = PerEntity::default();
    for &block in rpo {
        doms[block] = reachable.clone();
    }
    doms[unit.entry] = std::iter::once(unit.entry).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for &block in &rpo[1..] {
            let mut new = reachable.clone();
            for &pred in preds[block].iter().filter(|&&p| reachable.contains(&p)) {
                new = new.intersection(&doms[pred]).cloned().collect();
            }
            new.insert(block);
            if new != doms[block] {
                doms[block] = new;
                changed = true;
            }
        }
    }
    doms
}

fuzz_target!(|cfg: ArbitraryCfg| {
    let _ = env_logger::try_init();
    let mut unit = cfg.0;
    unit.validate().unwrap();

    split_critical_edges::run(&mut unit);
    unit.validate().unwrap();

    let preds = compute_preds(&unit);
    for data in unit.blocks.values() {
        let succlist = succs(data);
        if succlist.len() > 1 {
            for &succ in &succlist {
                assert_eq!(preds[succ].len(), 1);
            }
        }
    }

    let num_blocks = unit.blocks.len();
    assert!(!split_critical_edges::run(&mut unit));
    assert_eq!(unit.blocks.len(), num_blocks);

    let info = CFGInfo::new(&unit);
    let doms = set_dominators(&unit, &info.rpo);
    for &b1 in &info.rpo {
        for &b2 in &info.rpo {
            assert_eq!(info.dominates(b1, b2), doms[b2].contains(&b1));
        }
    }
    for &block in &info.rpo {
        assert!(info.dominates(unit.entry, block));
        assert!(info.dominates(block, block));
        if let Some(idom) = info.idom(block) {
            assert!(info.rpo_pos[idom] < info.rpo_pos[block]);
        }
    }
    for &(tail, head) in &info.back_edges {
        assert!(info.dominates(head, tail));
        let blocks = info.loop_blocks(head).unwrap();
        assert_eq!(blocks[0], head);
        assert!(blocks.contains(&tail));
    }
});

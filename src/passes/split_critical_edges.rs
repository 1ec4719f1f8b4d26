//! Critical-edge splitting.
//!
//! A critical edge runs from a block with several successors to a block
//! with several predecessors. Each one gets a fresh forwarding block
//! interposed, so that code can later be placed "on the edge" without
//! affecting any other path.
//!
//! Two kinds of block head need care when forwarding:
//!
//! - A `phidef` at the destination is reproduced in the forwarding
//!   block with fresh registers, which are then passed along with a
//!   `phijmp`. The forwarding block has a single predecessor, so its
//!   own `phidef` is an identity.
//! - A `landingpad` at the destination is moved into every forwarding
//!   block that reaches it, and the original is turned into a `nop`
//!   once all edges are processed.

use crate::cfg::{compute_preds, succs};
use crate::entity::EntityRef;
use crate::ir::{Block, InstKind, Unit};
use fxhash::FxHashSet;

/// Split every critical edge in `unit`. Returns `true` iff the unit
/// was modified.
pub fn run(unit: &mut Unit) -> bool {
    log::trace!(
        "split_critical_edges: running on unit:\n{}\n",
        unit.display("| ")
    );

    let preds = compute_preds(unit);
    let mut catch_blocks: FxHashSet<Block> = FxHashSet::default();
    let mut num_split = 0;

    // Blocks created below have a single successor; no need to visit them.
    let num_blocks = unit.blocks.len();
    for pred in (0..num_blocks).map(Block::new) {
        let succlist = succs(&unit.blocks[pred]);
        if succlist.len() <= 1 {
            continue;
        }
        for (index, &succ) in succlist.iter().enumerate() {
            if preds[succ].len() <= 1 {
                continue;
            }
            // Place the new block in the colder of the two areas.
            let area = std::cmp::max(unit.blocks[pred].area, unit.blocks[succ].area);
            let weight = unit.blocks[succ].weight;
            let middle = unit.make_block(area, weight);
            forward_jmp(unit, &mut catch_blocks, middle, succ);

            unit.blocks[pred]
                .code
                .last_mut()
                .expect("block with successors has a terminator")
                .kind
                .update_target(index, |target| *target = middle);
            log::trace!(
                "split_critical_edges: {} -> {} now goes through {}",
                pred,
                succ,
                middle
            );
            num_split += 1;
        }
    }

    drop_landingpads(unit, catch_blocks);

    log::debug!("split_critical_edges: split {} edges", num_split);
    num_split > 0
}

/// The landingpads of `catch_blocks` were copied into the forwarding
/// blocks; turn the originals into `nop`s.
fn drop_landingpads(unit: &mut Unit, catch_blocks: FxHashSet<Block>) {
    for block in catch_blocks {
        let head = &mut unit.blocks[block].code[0];
        assert!(
            head.kind == InstKind::LandingPad,
            "{} no longer starts with its landingpad",
            block
        );
        head.kind = InstKind::Nop;
    }
}

/// Fill `middle` with a jump to `dest`, reproducing any `phidef` or
/// `landingpad` at the top of `dest`.
fn forward_jmp(
    unit: &mut Unit,
    catch_blocks: &mut FxHashSet<Block>,
    middle: Block,
    dest: Block,
) {
    let head = unit.blocks[dest]
        .code
        .first()
        .cloned()
        .expect("branch target has no instructions");
    let ctx = head.ctx;

    match head.kind {
        InstKind::PhiDef { defs } => {
            let regs = (0..defs.len())
                .map(|_| unit.make_reg())
                .collect::<Vec<_>>();
            let defs = unit.make_tuple(&regs[..]);
            let uses = unit.make_tuple(&regs[..]);
            unit.append(middle, InstKind::PhiDef { defs }, ctx);
            unit.append(middle, InstKind::PhiJmp { target: dest, uses }, ctx);
            return;
        }
        InstKind::LandingPad => {
            catch_blocks.insert(dest);
            assert!(unit.blocks[middle].code.is_empty());
            unit.append(middle, InstKind::LandingPad, ctx);
        }
        _ => {}
    }

    unit.append(middle, InstKind::Jmp { target: dest }, ctx);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::{Area, IrCtx};

    fn has_critical_edges(unit: &Unit) -> bool {
        let preds = compute_preds(unit);
        unit.blocks.values().any(|data| {
            let succlist = succs(data);
            succlist.len() > 1 && succlist.iter().any(|&succ| preds[succ].len() > 1)
        })
    }

    #[test]
    fn split_basic() {
        let _ = env_logger::try_init();
        // B0: jcc -> B2, B1; B1: jmp B2; B2: ret
        let mut unit = Unit::new();
        let entry = unit.entry;
        let b1 = unit.make_block(Area::Main, 5);
        let b2 = unit.make_block(Area::Cold, 2);
        let cond = unit.make_reg();
        unit.append(
            entry,
            InstKind::Jcc {
                cond,
                taken: b2,
                next: b1,
            },
            IrCtx(1),
        );
        unit.append(b1, InstKind::Jmp { target: b2 }, IrCtx(2));
        unit.append(b2, InstKind::Ret, IrCtx(3));
        unit.validate().unwrap();
        assert!(has_critical_edges(&unit));

        assert!(run(&mut unit));
        unit.validate().unwrap();
        assert!(!has_critical_edges(&unit));

        assert_eq!(
            format!("{}", unit.display("")),
            "unit entry=B0 {
  B0 [main, weight 1]:
    jcc %0, B3, B1
  B1 [main, weight 5]:
    jmp B2
  B2 [cold, weight 2]:
    ret
  B3 [cold, weight 2]:
    jmp B2
}
"
        );
        // The jump carries the source context of the destination's head.
        assert_eq!(unit.blocks[Block::new(3)].code[0].ctx, IrCtx(3));

        // Nothing left to do the second time around.
        let before = format!("{}", unit.display_verbose(""));
        assert!(!run(&mut unit));
        assert_eq!(format!("{}", unit.display_verbose("")), before);
    }

    #[test]
    fn split_same_target_twice() {
        // Both arms of a jcc go to the same block: two edges, two
        // forwarding blocks.
        let mut unit = Unit::new();
        let entry = unit.entry;
        let b1 = unit.make_block(Area::Main, 1);
        let cond = unit.make_reg();
        unit.append(
            entry,
            InstKind::Jcc {
                cond,
                taken: b1,
                next: b1,
            },
            IrCtx(0),
        );
        unit.append(b1, InstKind::Ret, IrCtx(0));

        assert!(run(&mut unit));
        assert_eq!(unit.blocks.len(), 4);
        assert_eq!(
            unit.blocks[entry].code[0].kind,
            InstKind::Jcc {
                cond,
                taken: Block::new(2),
                next: Block::new(3),
            }
        );
        assert!(!has_critical_edges(&unit));
    }

    #[test]
    fn split_into_phidef() {
        // B0: jcc %0 -> B2, B1; B1: phijmp B2 (%1, %2); B2: phidef (%3, %4); ret
        let mut unit = Unit::new();
        let entry = unit.entry;
        let b1 = unit.make_block(Area::Main, 1);
        let b2 = unit.make_block(Area::Main, 1);
        let cond = unit.make_reg();
        let regs = (0..4).map(|_| unit.make_reg()).collect::<Vec<_>>();
        let uses = unit.make_tuple(&regs[0..2]);
        let defs = unit.make_tuple(&regs[2..4]);
        unit.append(
            entry,
            InstKind::Jcc {
                cond,
                taken: b2,
                next: b1,
            },
            IrCtx(0),
        );
        unit.append(b1, InstKind::PhiJmp { target: b2, uses }, IrCtx(0));
        unit.append(b2, InstKind::PhiDef { defs }, IrCtx(9));
        unit.append(b2, InstKind::Ret, IrCtx(0));
        unit.validate().unwrap();

        assert!(run(&mut unit));
        unit.validate().unwrap();

        assert_eq!(
            format!("{}", unit.display("")),
            "unit entry=B0 {
  B0 [main, weight 1]:
    jcc %0, B3, B1
  B1 [main, weight 1]:
    phijmp B2, (%1, %2)
  B2 [main, weight 1]:
    phidef (%3, %4)
    ret
  B3 [main, weight 1]:
    phidef (%5, %6)
    phijmp B2, (%5, %6)
}
"
        );
        let middle = &unit.blocks[Block::new(3)];
        assert!(middle.code.iter().all(|inst| inst.ctx == IrCtx(9)));
        assert!(!run(&mut unit));
    }

    #[test]
    fn split_into_landingpad() {
        // Two invokes share a continuation and a landing pad:
        // B0: jcc -> B1, B2
        // B1: invoke %1 -> B3, catch B4
        // B2: invoke %2 -> B3, catch B4
        // B3: ret
        // B4: landingpad; ret
        let mut unit = Unit::new();
        let entry = unit.entry;
        let b1 = unit.make_block(Area::Main, 4);
        let b2 = unit.make_block(Area::Main, 4);
        let b3 = unit.make_block(Area::Main, 8);
        let b4 = unit.make_block(Area::Frozen, 0);
        let cond = unit.make_reg();
        let f = unit.make_reg();
        let g = unit.make_reg();
        unit.append(
            entry,
            InstKind::Jcc {
                cond,
                taken: b1,
                next: b2,
            },
            IrCtx(0),
        );
        unit.append(
            b1,
            InstKind::Invoke {
                callee: f,
                next: b3,
                catch: b4,
            },
            IrCtx(0),
        );
        unit.append(
            b2,
            InstKind::Invoke {
                callee: g,
                next: b3,
                catch: b4,
            },
            IrCtx(0),
        );
        unit.append(b3, InstKind::Ret, IrCtx(0));
        unit.append(b4, InstKind::LandingPad, IrCtx(4));
        unit.append(b4, InstKind::Ret, IrCtx(0));
        unit.validate().unwrap();

        assert!(run(&mut unit));
        unit.validate().unwrap();

        assert_eq!(
            format!("{}", unit.display("")),
            "unit entry=B0 {
  B0 [main, weight 1]:
    jcc %0, B1, B2
  B1 [main, weight 4]:
    invoke %1, B5, catch B6
  B2 [main, weight 4]:
    invoke %2, B7, catch B8
  B3 [main, weight 8]:
    ret
  B4 [frozen, weight 0]:
    nop
    ret
  B5 [main, weight 8]:
    jmp B3
  B6 [frozen, weight 0]:
    landingpad
    jmp B4
  B7 [main, weight 8]:
    jmp B3
  B8 [frozen, weight 0]:
    landingpad
    jmp B4
}
"
        );
        assert!(!has_critical_edges(&unit));
        assert!(!run(&mut unit));
    }

    #[test]
    #[should_panic(expected = "no longer starts with its landingpad")]
    fn catch_block_must_keep_its_landingpad() {
        let mut unit = Unit::new();
        let entry = unit.entry;
        unit.append(entry, InstKind::Ret, IrCtx(0));
        let mut catch_blocks = FxHashSet::default();
        catch_blocks.insert(entry);
        drop_landingpads(&mut unit, catch_blocks);
    }
}

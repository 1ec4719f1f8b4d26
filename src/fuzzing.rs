//! Fuzzing-specific utilities.

use crate::entity::EntityRef;
use crate::ir::{Area, Block, InstKind, IrCtx, Unit};
use libfuzzer_sys::arbitrary;

/// An arbitrary, structurally valid unit: random edges, with some
/// blocks headed by a `phidef` or a `landingpad`.
#[derive(Clone, Debug)]
pub struct ArbitraryCfg(pub Unit);

impl<'a> arbitrary::Arbitrary<'a> for ArbitraryCfg {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut unit = Unit::new();
        let num_blocks = u.int_in_range(1..=32usize)?;
        for _ in 1..num_blocks {
            let area = match u.int_in_range(0..=2u8)? {
                0 => Area::Main,
                1 => Area::Cold,
                _ => Area::Frozen,
            };
            let weight = u.int_in_range(0..=1000u64)?;
            unit.make_block(area, weight);
        }

        // Block heads first, so that terminators can see phidef widths.
        let mut phi_widths = vec![0usize; num_blocks];
        for index in 1..num_blocks {
            let block = Block::new(index);
            let ctx = IrCtx(index as u32);
            match u.int_in_range(0..=3u8)? {
                0 => unit.append(block, InstKind::LandingPad, ctx),
                1 => {
                    let width = u.int_in_range(1..=3usize)?;
                    let regs = (0..width).map(|_| unit.make_reg()).collect::<Vec<_>>();
                    let defs = unit.make_tuple(&regs[..]);
                    unit.append(block, InstKind::PhiDef { defs }, ctx);
                    phi_widths[index] = width;
                }
                _ => {}
            }
        }

        let cond = unit.make_reg();
        for index in 0..num_blocks {
            let block = Block::new(index);
            let ctx = IrCtx(index as u32);
            let num_targets = u.int_in_range(0..=4usize)?;
            let mut targets = vec![];
            for _ in 0..num_targets {
                targets.push(Block::new(u.int_in_range(0..=num_blocks - 1)?));
            }
            let kind = match targets.len() {
                0 => InstKind::Ret,
                1 if phi_widths[targets[0].index()] > 0 => {
                    let regs = (0..phi_widths[targets[0].index()])
                        .map(|_| unit.make_reg())
                        .collect::<Vec<_>>();
                    InstKind::PhiJmp {
                        target: targets[0],
                        uses: unit.make_tuple(&regs[..]),
                    }
                }
                1 => InstKind::Jmp { target: targets[0] },
                2 if u.arbitrary::<bool>()? => InstKind::Invoke {
                    callee: cond,
                    next: targets[0],
                    catch: targets[1],
                },
                2 => InstKind::Jcc {
                    cond,
                    taken: targets[0],
                    next: targets[1],
                },
                _ => InstKind::Switch {
                    index: cond,
                    targets,
                },
            };
            unit.append(block, kind, ctx);
        }

        Ok(ArbitraryCfg(unit))
    }
}

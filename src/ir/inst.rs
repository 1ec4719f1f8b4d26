use super::{Block, Reg, Tuple};

/// Opaque source-context token. Copied verbatim onto any instruction
/// that is duplicated or synthesized from another one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IrCtx(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstKind {
    Nop,
    /// Unconditional jump.
    Jmp { target: Block },
    /// Two-way conditional branch on a flags/condition register.
    Jcc { cond: Reg, taken: Block, next: Block },
    /// Multi-way branch indexed by `index`.
    Switch { index: Reg, targets: Vec<Block> },
    /// Call that either returns normally to `next` or unwinds to
    /// `catch`, which must begin with a `landingpad`.
    Invoke { callee: Reg, next: Block, catch: Block },
    /// Binds fresh registers to the values supplied by each incoming
    /// `phijmp`. Only legal as a block's first instruction.
    PhiDef { defs: Tuple },
    /// Jump that supplies `uses` to the target's `phidef`.
    PhiJmp { target: Block, uses: Tuple },
    /// Marks an exception-handling entry point. Only legal as a block's
    /// first instruction.
    LandingPad,
    Ret,
    Trap,
    /// Anything this crate does not need to look inside.
    Other {
        mnemonic: &'static str,
        defs: Tuple,
        uses: Tuple,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inst {
    pub kind: InstKind,
    pub ctx: IrCtx,
}

impl Inst {
    pub fn new(kind: InstKind, ctx: IrCtx) -> Self {
        Inst { kind, ctx }
    }
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        match self {
            InstKind::Jmp { .. }
            | InstKind::Jcc { .. }
            | InstKind::Switch { .. }
            | InstKind::Invoke { .. }
            | InstKind::PhiJmp { .. }
            | InstKind::Ret
            | InstKind::Trap => true,
            InstKind::Nop
            | InstKind::PhiDef { .. }
            | InstKind::LandingPad
            | InstKind::Other { .. } => false,
        }
    }

    /// Instructions that may only appear at the top of a block.
    pub fn is_block_head(&self) -> bool {
        matches!(self, InstKind::PhiDef { .. } | InstKind::LandingPad)
    }

    pub fn opcode_name(&self) -> &'static str {
        match self {
            InstKind::Nop => "nop",
            InstKind::Jmp { .. } => "jmp",
            InstKind::Jcc { .. } => "jcc",
            InstKind::Switch { .. } => "switch",
            InstKind::Invoke { .. } => "invoke",
            InstKind::PhiDef { .. } => "phidef",
            InstKind::PhiJmp { .. } => "phijmp",
            InstKind::LandingPad => "landingpad",
            InstKind::Ret => "ret",
            InstKind::Trap => "trap",
            InstKind::Other { mnemonic, .. } => *mnemonic,
        }
    }

    /// Visit control-flow targets in successor order: `jcc` yields the
    /// taken target before the fallthrough, `invoke` the normal return
    /// before the catch target.
    pub fn visit_targets<F: FnMut(Block)>(&self, mut f: F) {
        match self {
            InstKind::Jmp { target } | InstKind::PhiJmp { target, .. } => f(*target),
            InstKind::Jcc { taken, next, .. } => {
                f(*taken);
                f(*next);
            }
            InstKind::Switch { targets, .. } => {
                for &target in targets {
                    f(target);
                }
            }
            InstKind::Invoke { next, catch, .. } => {
                f(*next);
                f(*catch);
            }
            _ => {}
        }
    }

    /// Visit every register tuple this instruction refers to.
    pub fn visit_tuples<F: FnMut(Tuple)>(&self, mut f: F) {
        match self {
            InstKind::PhiDef { defs } => f(*defs),
            InstKind::PhiJmp { uses, .. } => f(*uses),
            InstKind::Other { defs, uses, .. } => {
                f(*defs);
                f(*uses);
            }
            _ => {}
        }
    }

    pub fn num_targets(&self) -> usize {
        match self {
            InstKind::Jmp { .. } | InstKind::PhiJmp { .. } => 1,
            InstKind::Jcc { .. } | InstKind::Invoke { .. } => 2,
            InstKind::Switch { targets, .. } => targets.len(),
            _ => 0,
        }
    }

    /// Mutate the `index`th target, in `visit_targets` order.
    pub fn update_target<F: FnOnce(&mut Block)>(&mut self, index: usize, f: F) {
        match (index, self) {
            (0, InstKind::Jmp { target }) | (0, InstKind::PhiJmp { target, .. }) => f(target),
            (0, InstKind::Jcc { taken, .. }) => f(taken),
            (1, InstKind::Jcc { next, .. }) => f(next),
            (0, InstKind::Invoke { next, .. }) => f(next),
            (1, InstKind::Invoke { catch, .. }) => f(catch),
            (i, InstKind::Switch { targets, .. }) if i < targets.len() => f(&mut targets[i]),
            (i, this) => panic!("out of bounds: index {} inst {:?}", i, this),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn jcc_targets_taken_first() {
        let mut kind = InstKind::Jcc {
            cond: Reg::new(0),
            taken: Block::new(1),
            next: Block::new(2),
        };
        let mut seen = vec![];
        kind.visit_targets(|b| seen.push(b));
        assert_eq!(seen, vec![Block::new(1), Block::new(2)]);

        kind.update_target(1, |b| *b = Block::new(5));
        assert_eq!(
            kind,
            InstKind::Jcc {
                cond: Reg::new(0),
                taken: Block::new(1),
                next: Block::new(5),
            }
        );
        assert!(kind.is_terminator());
        assert_eq!(kind.num_targets(), 2);
    }

    #[test]
    #[should_panic]
    fn update_target_out_of_bounds() {
        let mut kind = InstKind::Jmp {
            target: Block::new(0),
        };
        kind.update_target(1, |b| *b = Block::new(1));
    }
}

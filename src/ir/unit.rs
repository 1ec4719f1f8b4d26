use super::{Block, Inst, InstKind, IrCtx, Reg, Tuple, UnitDisplay};
use crate::entity::{EntityRef, EntityVec};
use crate::errors::ValidationError;
use crate::pool::ListPool;
use fxhash::FxHashMap;

/// Code-layout area. Ordered hottest first, so the colder of two areas
/// is their `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Area {
    Main,
    Cold,
    Frozen,
}

impl std::default::Default for Area {
    fn default() -> Self {
        Area::Main
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Area::Main => write!(f, "main"),
            Area::Cold => write!(f, "cold"),
            Area::Frozen => write!(f, "frozen"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlockData {
    /// Instructions; only the last may transfer control.
    pub code: Vec<Inst>,
    /// Layout area this block is placed in.
    pub area: Area,
    /// Execution-frequency estimate. A layout hint only.
    pub weight: u64,
}

impl BlockData {
    pub fn terminator(&self) -> Option<&Inst> {
        self.code.last().filter(|inst| inst.kind.is_terminator())
    }
}

/// A constant-pool key. Doubles are keyed by their bit pattern so that
/// the pool can hash them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Const {
    Bool(bool),
    Int(i64),
    Double(u64),
    Undef,
}

impl From<f64> for Const {
    fn from(value: f64) -> Self {
        Const::Double(value.to_bits())
    }
}

/// One compiled function's instruction graph.
#[derive(Clone, Debug, Default)]
pub struct Unit {
    /// Block bodies, indexed by label.
    pub blocks: EntityVec<Block, BlockData>,
    /// Entry block.
    pub entry: Block,
    /// Register tuples referenced by `phidef`/`phijmp` and opaque
    /// instructions.
    pub tuples: ListPool<Reg>,
    /// Deduplicated constants, each materialized in its own register.
    pub consts: FxHashMap<Const, Reg>,
    num_regs: usize,
}

impl Unit {
    /// Create a unit holding a single, empty entry block.
    pub fn new() -> Unit {
        let mut unit = Unit::default();
        unit.entry = unit.make_block(Area::Main, 1);
        unit
    }

    pub fn make_block(&mut self, area: Area, weight: u64) -> Block {
        let id = self.blocks.push(BlockData {
            code: vec![],
            area,
            weight,
        });
        log::trace!("make_block: {} in {} weight {}", id, area, weight);
        id
    }

    pub fn make_reg(&mut self) -> Reg {
        let reg = Reg::new(self.num_regs);
        self.num_regs += 1;
        reg
    }

    pub fn num_regs(&self) -> usize {
        self.num_regs
    }

    pub fn make_tuple(&mut self, regs: &[Reg]) -> Tuple {
        self.tuples.from_slice(regs)
    }

    pub fn make_const<C: Into<Const>>(&mut self, value: C) -> Reg {
        let value = value.into();
        if let Some(&reg) = self.consts.get(&value) {
            return reg;
        }
        let reg = self.make_reg();
        self.consts.insert(value, reg);
        reg
    }

    pub fn append(&mut self, block: Block, kind: InstKind, ctx: IrCtx) {
        self.blocks[block].code.push(Inst::new(kind, ctx));
    }

    /// Check the structural invariants every analysis in this crate
    /// relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.blocks.get(self.entry).is_none() {
            return Err(ValidationError::BadEntry(self.entry));
        }

        for (block, data) in self.blocks.entries() {
            let last = match data.code.last() {
                Some(last) => last,
                None => return Err(ValidationError::EmptyBlock(block)),
            };
            if !last.kind.is_terminator() {
                return Err(ValidationError::MissingTerminator(block));
            }

            for (index, inst) in data.code.iter().enumerate() {
                if index + 1 < data.code.len() && inst.kind.is_terminator() {
                    return Err(ValidationError::EarlyTerminator { block, index });
                }
                let mut bad_tuple = false;
                inst.kind
                    .visit_tuples(|tuple| bad_tuple |= self.tuples.get(tuple).is_none());
                if bad_tuple {
                    return Err(ValidationError::BadTuple { block, index });
                }
                if index > 0 && inst.kind.is_block_head() {
                    return Err(ValidationError::MisplacedHead {
                        block,
                        index,
                        opcode: inst.kind.opcode_name(),
                    });
                }
            }

            let mut bad_target = None;
            last.kind.visit_targets(|target| {
                if bad_target.is_none() && self.blocks.get(target).is_none() {
                    bad_target = Some(target);
                }
            });
            if let Some(target) = bad_target {
                return Err(ValidationError::BadTarget { block, target });
            }

            if let InstKind::PhiJmp { target, uses } = &last.kind {
                let expected = match self.blocks[*target].code.first() {
                    Some(Inst {
                        kind: InstKind::PhiDef { defs },
                        ..
                    }) => defs.len(),
                    _ => 0,
                };
                if expected != uses.len() {
                    return Err(ValidationError::PhiWidthMismatch {
                        block,
                        target: *target,
                        expected,
                        actual: uses.len(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn display<'a>(&'a self, indent: &'a str) -> UnitDisplay<'a> {
        UnitDisplay(self, indent, /* verbose = */ false)
    }

    pub fn display_verbose<'a>(&'a self, indent: &'a str) -> UnitDisplay<'a> {
        UnitDisplay(self, indent, /* verbose = */ true)
    }
}

//! Error types.

use crate::ir::Block;

/// A structural problem found by `Unit::validate`.
///
/// Analyses and passes assume a valid unit; handing them an invalid
/// one is a bug in an earlier phase and trips an assertion instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The entry label does not name a block.
    BadEntry(Block),
    /// A block has no instructions at all.
    EmptyBlock(Block),
    /// A block's last instruction does not transfer control.
    MissingTerminator(Block),
    /// A control transfer appears before the end of its block.
    EarlyTerminator { block: Block, index: usize },
    /// A `phidef` or `landingpad` that is not the block's first
    /// instruction.
    MisplacedHead {
        block: Block,
        index: usize,
        opcode: &'static str,
    },
    /// An instruction refers to a register tuple outside the unit's
    /// pool.
    BadTuple { block: Block, index: usize },
    /// A branch names a block that does not exist.
    BadTarget { block: Block, target: Block },
    /// A `phijmp` passes a different number of values than its target's
    /// `phidef` binds.
    PhiWidthMismatch {
        block: Block,
        target: Block,
        expected: usize,
        actual: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::BadEntry(entry) => write!(f, "entry {} is not a block", entry),
            ValidationError::EmptyBlock(block) => write!(f, "{} is empty", block),
            ValidationError::MissingTerminator(block) => {
                write!(f, "{} does not end in a control transfer", block)
            }
            ValidationError::EarlyTerminator { block, index } => write!(
                f,
                "{} has a control transfer at {} before its end",
                block, index
            ),
            ValidationError::MisplacedHead {
                block,
                index,
                opcode,
            } => write!(f, "{} has {} at {}, not at its top", block, opcode, index),
            ValidationError::BadTuple { block, index } => write!(
                f,
                "{} has a register tuple at {} from another unit",
                block, index
            ),
            ValidationError::BadTarget { block, target } => {
                write!(f, "{} branches to nonexistent {}", block, target)
            }
            ValidationError::PhiWidthMismatch {
                block,
                target,
                expected,
                actual,
            } => write!(
                f,
                "{} passes {} values to {}, whose phidef binds {}",
                block, actual, target, expected
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

//! Low-level IR: units, blocks and instructions.

use crate::declare_entity;
use crate::pool::ListRef;

mod display;
mod inst;
mod unit;

pub use display::*;
pub use inst::*;
pub use unit::*;

declare_entity!(Block, "B");
declare_entity!(Reg, "%");

/// An ordered tuple of virtual registers, stored in the unit's
/// `tuples` pool.
pub type Tuple = ListRef<Reg>;

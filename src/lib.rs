//! Control-flow graph normalization and analysis for a JIT's low-level
//! instruction representation.
//!
//! A [`Unit`] holds one function's blocks. The crate provides:
//!
//! - [`passes::split_critical_edges`], which interposes forwarding
//!   blocks on every critical edge while keeping `phidef`s and
//!   `landingpad`s consistent;
//! - [`cfg::find_dominators`] and [`cfg::dominates`];
//! - [`cfg::find_back_edges`] and [`cfg::find_loop_blocks`].
//!
//! [`cfg::CFGInfo`] bundles all of the analyses, and
//! [`passes::normalize`] runs the whole pipeline.

pub mod cfg;
pub mod entity;
mod errors;
mod ir;
pub mod passes;
pub mod pool;

pub use errors::*;
pub use ir::*;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;

#![forbid(unsafe_code)]

//! Generalized recognizers for context-free grammars, based on worklist
//! processing of *descriptors* (dotted productions with input extents). A
//! parse produces two sets which together form a compact representation of
//! every derivation of the input:
//!
//!   * the set of all [`Descriptor`]s processed, and
//!   * the set of all [`Epn`]s (extended packed nodes), the edges of the
//!     shared packed parse forest.
//!
//! The input is recognized iff a descriptor for a completed start-rule
//! production spans it entirely (see [`ParseOutput::accepted`]).
//!
//! Three engines produce identical output sets from the same grammar and
//! input: a single-threaded reference engine, a coordinator-plus-worker-pool
//! engine, and an engine which grows a tree of workers on demand. They are
//! selected with [`EngineKind`] via [`CdsParserBuilder`]. Left-recursive and
//! ambiguous grammars are handled uniformly; no grammar transformation is
//! performed.

mod check;
mod descriptor;
mod engine;
mod epn;
pub mod parser;
mod pool;
mod sequential;
mod tree;

pub use check::{check_output, Violation};
pub use descriptor::Descriptor;
pub use epn::Epn;
pub use parser::{CdsParserBuilder, EngineKind, ParseOutput, ParseStats};

use std::collections::HashSet;

/// The set of processed descriptors; grows monotonically during a parse.
pub type DescriptorSet = HashSet<Descriptor>;
/// The set of extended packed nodes; grows monotonically during a parse.
pub type EpnSet = HashSet<Epn>;

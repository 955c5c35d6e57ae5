use cdsgrammar::{CdsGrammar, PIdx, SIdx};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;

/// An extended packed node: an edge of the shared packed parse forest. The
/// pivot is the input position separating the already-matched prefix from the
/// symbol whose consumption this node records.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Epn {
    pub pidx: PIdx,
    pub dot: SIdx,
    pub left: usize,
    pub pivot: usize,
    pub right: usize,
}

impl Epn {
    /// The node recording that `d` was reached by consuming the symbol
    /// spanning `pivot..d.right`.
    pub fn new(d: &Descriptor, pivot: usize) -> Epn {
        Epn {
            pidx: d.pidx,
            dot: d.dot,
            left: d.left,
            pivot,
            right: d.right,
        }
    }

    /// The zero-width node for a completed empty production.
    pub fn zero_width(d: &Descriptor) -> Epn {
        Epn::new(d, d.right)
    }

    /// Return a pretty-printed version of this node.
    pub fn pp(&self, grm: &CdsGrammar) -> String {
        format!(
            "[{}, {}, {}, {}]",
            grm.pp_prod(self.pidx, Some(self.dot)),
            self.left,
            self.pivot,
            self.right
        )
    }
}

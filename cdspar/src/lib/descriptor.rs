use std::hash::{Hash, Hasher};

use cdsgrammar::{CdsGrammar, PIdx, SIdx, Symbol};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dotted production with input extents: the suspended position of a parse.
/// `left` is the input position at which parsing of this production began;
/// `right` is the position reached so far (and, for completed descriptors,
/// the end of the span).
///
/// Equality and hashing cover `(pidx, dot, left, right)` only. Since
/// productions are collapsed structurally by `cdsgrammar`, this is equivalent
/// to structural equality over the production's symbols. The `force` bit is
/// a processing hint, never part of a descriptor's identity.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Descriptor {
    pub pidx: PIdx,
    pub dot: SIdx,
    pub left: usize,
    pub right: usize,
    /// When set, the descriptor bypasses the "already processed" check once.
    /// Only the tree engine produces forced descriptors.
    pub force: bool,
}

impl Descriptor {
    pub fn new(pidx: PIdx, dot: SIdx, left: usize, right: usize) -> Descriptor {
        Descriptor {
            pidx,
            dot,
            left,
            right,
            force: false,
        }
    }

    /// A fresh descriptor at the start of production `pidx`, with both
    /// extents at input position `at`.
    pub fn start(pidx: PIdx, at: usize) -> Descriptor {
        Descriptor::new(pidx, SIdx(0), at, at)
    }

    /// Is the dot at the end of the production?
    pub fn is_completed(&self, grm: &CdsGrammar) -> bool {
        usize::from(self.dot) == grm.prod(self.pidx).len()
    }

    /// Does the production have an empty right-hand side?
    pub fn is_empty(&self, grm: &CdsGrammar) -> bool {
        grm.prod(self.pidx).is_empty()
    }

    /// The symbol after the dot.
    ///
    /// # Panics
    ///
    /// If the descriptor is completed.
    pub fn next_symbol(&self, grm: &CdsGrammar) -> Symbol {
        grm.prod(self.pidx)[usize::from(self.dot)]
    }

    /// A copy of this descriptor with the dot advanced by one symbol. The
    /// copy is not forced.
    pub fn advance(&self) -> Descriptor {
        Descriptor::new(self.pidx, SIdx(self.dot.0 + 1), self.left, self.right)
    }

    /// A copy of this descriptor with the force bit set.
    pub fn forced(&self) -> Descriptor {
        Descriptor {
            force: true,
            ..*self
        }
    }

    /// Return a pretty-printed version of this descriptor.
    pub fn pp(&self, grm: &CdsGrammar) -> String {
        format!(
            "[{}, {}, {}]",
            grm.pp_prod(self.pidx, Some(self.dot)),
            self.left,
            self.right
        )
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Descriptor) -> bool {
        self.pidx == other.pidx
            && self.dot == other.dot
            && self.left == other.left
            && self.right == other.right
    }
}

impl Eq for Descriptor {}

impl Hash for Descriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pidx.hash(state);
        self.dot.hash(state);
        self.left.hash(state);
        self.right.hash(state);
    }
}

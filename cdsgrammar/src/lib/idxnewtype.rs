// This macro generates a struct which exposes the index API used throughout
// this crate and its dependents.

use std::mem::size_of;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The underlying storage type for grammar indices. All practical grammars
/// are comfortably within `u32`, so we use narrow storage knowing that we can
/// transparently widen it in the future without changing the visible API.
pub type CdsStorageT = u32;

macro_rules! IdxNewtype {
    ($(#[$attr:meta])* $n: ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $n(pub CdsStorageT);

        impl From<$n> for usize {
            fn from(st: $n) -> Self {
                debug_assert!(size_of::<usize>() >= size_of::<CdsStorageT>());
                st.0 as usize
            }
        }

        impl From<usize> for $n {
            fn from(st: usize) -> Self {
                debug_assert!(st <= CdsStorageT::MAX as usize);
                $n(st as CdsStorageT)
            }
        }

        impl $n {
            pub fn as_storaget(self) -> CdsStorageT {
                self.0
            }
        }
    }
}

IdxNewtype!(
    /// A type specifically for rule (i.e. nonterminal) indices.
    ///
    /// It is guaranteed that `RIdx` can be converted, without loss of
    /// precision, to `usize` with the idiom `usize::from(x_ridx)`.
    RIdx
);
IdxNewtype!(
    /// A type specifically for production indices (e.g. a rule `E ::= A | B`
    /// would have two productions for the single rule `E`).
    PIdx
);
IdxNewtype!(
    /// A type specifically for symbol positions within a production. A
    /// production of `n` symbols has `n + 1` valid positions: `0` (before the
    /// first symbol) up to and including `n` (after the last).
    SIdx
);
IdxNewtype!(
    /// A type specifically for token (i.e. terminal) indices.
    TIdx
);

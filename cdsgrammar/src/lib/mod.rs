#![forbid(unsafe_code)]

//! A library for building and querying the Context Free Grammars (CFGs) that
//! drive descriptor-processing recognizers such as those in the `cdspar`
//! crate. Grammars are deliberately plain: no precedences, no actions, no
//! lexing rules, just rules, productions, and symbols.
//!
//! A note on the terminology we use, since there's no universal standard:
//!
//!   * A rule is a mapping from a nonterminal name to 1 or more productions
//!     (the latter of which is often called 'alternatives').
//!   * A symbol is either a nonterminal or a terminal.
//!   * A production is a (possibly empty) ordered sequence of symbols.
//!
//! Every nonterminal has a corresponding rule (and thus the two concepts are
//! interchangeable); terminals are precisely those symbols which never appear
//! as the left-hand side of a rule.
//!
//! cdsgrammar makes the following guarantees about grammars:
//!
//!   * The grammar has a single start rule accessed by `start_rule_idx`. By
//!     default it is the first rule added to the builder.
//!   * The rules are numbered from `0` to `rules_len() - 1` (inclusive), in
//!     the order they were first added.
//!   * The tokens are numbered from `0` to `tokens_len() - 1` (inclusive).
//!   * The productions are numbered from `0` to `prods_len() - 1`
//!     (inclusive), and no two productions have the same rule and the same
//!     sequence of symbols: duplicates are collapsed when the grammar is
//!     built. Two productions are therefore structurally equal if, and only
//!     if, their `PIdx`s are equal.

mod builder;
mod grammar;
mod idxnewtype;
mod parser;

pub use builder::{
    CdsGrammarBuilder, GrammarError, GrammarErrorKind, GrammarWarning, GrammarWarningKind,
};
pub use grammar::CdsGrammar;
pub use idxnewtype::{CdsStorageT, PIdx, RIdx, SIdx, TIdx};
pub use parser::parse_grammar;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A grammar symbol: either a reference to a rule (i.e. a nonterminal) or to
/// a token (i.e. a terminal).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symbol {
    Rule(RIdx),
    Token(TIdx),
}

//! An advisory checker for parse output: verifies that the descriptor and
//! node sets are closed under the four actions, i.e. that every descriptor
//! and node the actions demand of an output set is actually present. It
//! never mutates anything and is not run during normal parsing.

use cdsgrammar::{CdsGrammar, Symbol};

use crate::{descriptor::Descriptor, epn::Epn, parser::map_input, DescriptorSet, EpnSet};

/// A closure requirement the output sets fail to meet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Violation {
    MissingDescriptor(Descriptor),
    MissingEpn(Epn),
}

impl Violation {
    /// Return a pretty-printed version of this violation.
    pub fn pp(&self, grm: &CdsGrammar) -> String {
        match self {
            Violation::MissingDescriptor(d) => format!("Missing descriptor {}", d.pp(grm)),
            Violation::MissingEpn(e) => format!("Missing EPN {}", e.pp(grm)),
        }
    }
}

fn require_descriptor(set: &DescriptorSet, d: Descriptor, vs: &mut Vec<Violation>) -> bool {
    if set.contains(&d) {
        true
    } else {
        vs.push(Violation::MissingDescriptor(d));
        false
    }
}

fn require_epn(set: &EpnSet, e: Epn, vs: &mut Vec<Violation>) {
    if !set.contains(&e) {
        vs.push(Violation::MissingEpn(e));
    }
}

/// Check `(descriptors, epns)` against `grm` and `input`. An empty result
/// means the sets meet every requirement; otherwise each missing element is
/// reported (an element may be reported more than once if several
/// requirements demand it).
pub fn check_output(
    grm: &CdsGrammar,
    input: &[&str],
    descriptors: &DescriptorSet,
    epns: &EpnSet,
) -> Vec<Violation> {
    let toks = map_input(grm, input);
    let mut violations = Vec::new();

    // Every production of the start rule must have been seeded.
    for &pidx in grm.rule_prods(grm.start_rule_idx()) {
        require_descriptor(descriptors, Descriptor::start(pidx, 0), &mut violations);
    }

    for d in descriptors {
        if !d.is_completed(grm) {
            match d.next_symbol(grm) {
                Symbol::Token(tidx) => {
                    // A matching token must have been consumed.
                    if toks.get(d.right) == Some(&Some(tidx)) {
                        let mut nd = d.advance();
                        nd.right = d.right + 1;
                        if require_descriptor(descriptors, nd, &mut violations) {
                            require_epn(epns, Epn::new(&nd, d.right), &mut violations);
                        }
                    }
                }
                Symbol::Rule(ridx) => {
                    // The rule must have been descended into...
                    for &pidx in grm.rule_prods(ridx) {
                        require_descriptor(
                            descriptors,
                            Descriptor::start(pidx, d.right),
                            &mut violations,
                        );
                    }
                    // ...and every completion of it skipped over.
                    for c in descriptors {
                        if c.is_completed(grm) && grm.prod_rule(c.pidx) == ridx && c.left == d.right
                        {
                            let mut nd = d.advance();
                            nd.right = c.right;
                            require_descriptor(descriptors, nd, &mut violations);
                            require_epn(epns, Epn::new(&nd, d.right), &mut violations);
                        }
                    }
                }
            }
        } else if d.is_empty(grm) {
            require_epn(epns, Epn::zero_width(d), &mut violations);
        }
    }

    violations
}

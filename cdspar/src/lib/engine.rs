//! The four descriptor-processing actions (match, descend, skip, ascend)
//! expressed once over a small set of per-engine hooks. Engines implement
//! the hooks (how neighbouring descriptors are looked up and where new work
//! and nodes are emitted); the transition logic itself is identical across
//! engines and statically dispatched.

use std::collections::HashSet;

use cdsgrammar::{CdsGrammar, PIdx, RIdx, Symbol, TIdx};

use crate::{descriptor::Descriptor, epn::Epn, parser::ActionCounts};

pub(crate) trait EngineCore {
    fn grammar(&self) -> &CdsGrammar;
    fn input(&self) -> &[Option<TIdx>];
    fn counts(&self) -> &ActionCounts;

    /// Scan for completed descriptors of rule `ridx` whose span begins at
    /// `at`. Returns their right extents and the productions they represent.
    fn completed_neighbours(&mut self, ridx: RIdx, at: usize) -> (HashSet<usize>, Vec<PIdx>);

    /// Scan for non-completed descriptors whose next symbol is rule `ridx`
    /// and whose right extent is `left`, returning advanced copies of them.
    fn ascend_targets(&mut self, ridx: RIdx, left: usize) -> Vec<Descriptor>;

    /// Emit a descriptor towards the worklist. Implementations may drop
    /// descriptors they know to have been processed already; the
    /// authoritative duplicate check happens at admission time.
    fn push_descriptor(&mut self, d: Descriptor);

    fn push_epn(&mut self, e: Epn);

    /// Called on a skip with the productions of `ridx` that had a completed
    /// representative in the scan. Engines whose scans can be stale re-queue
    /// the remainder; the default does nothing.
    fn requeue_unrepresented(&mut self, _ridx: RIdx, _at: usize, _represented: &[PIdx]) {}

    /// Emit a start descriptor `(β, 0, 0, 0)` for every production `β` of
    /// the start rule.
    fn seed_worklist(&mut self) {
        let pidxs = self
            .grammar()
            .rule_prods(self.grammar().start_rule_idx())
            .to_vec();
        for pidx in pidxs {
            self.push_descriptor(Descriptor::start(pidx, 0));
        }
    }

    /// Match: if the token after the dot is the next input token, emit the
    /// advanced descriptor and the node recording the token's consumption.
    fn match_terminal(&mut self, d: Descriptor, tidx: TIdx) {
        self.counts().inc_match();
        if self.input().get(d.right) == Some(&Some(tidx)) {
            let mut nd = d.advance();
            nd.right = d.right + 1;
            self.push_descriptor(nd);
            self.push_epn(Epn::new(&nd, d.right));
        }
    }

    /// Descend: emit a start descriptor at `pivot` for every production of
    /// rule `ridx`.
    fn descend(&mut self, ridx: RIdx, pivot: usize) {
        self.counts().inc_descend();
        let pidxs = self.grammar().rule_prods(ridx).to_vec();
        for pidx in pidxs {
            self.push_descriptor(Descriptor::start(pidx, pivot));
        }
    }

    /// Skip: `d` has already been advanced over a nonterminal but still
    /// carries its old right extent, which becomes the pivot; one descriptor
    /// and node are emitted per known right extent of the sub-derivation.
    fn skip(&mut self, d: Descriptor, right_extents: &HashSet<usize>) {
        self.counts().inc_skip();
        for &r in right_extents {
            let mut nd = d;
            nd.right = r;
            self.push_descriptor(nd);
            self.push_epn(Epn::new(&nd, d.right));
        }
    }

    /// Ascend: a production has been completed up to `right`; every waiting
    /// descriptor is re-emitted with its right extent moved there, its old
    /// right extent becoming the pivot.
    fn ascend(&mut self, targets: Vec<Descriptor>, right: usize) {
        self.counts().inc_ascend();
        for t in targets {
            let mut nd = t;
            nd.right = right;
            self.push_descriptor(nd);
            self.push_epn(Epn::new(&nd, t.right));
        }
    }

    /// Process one admitted descriptor, dispatching to the action its dot
    /// position and next symbol demand.
    fn process_descriptor(&mut self, d: Descriptor) {
        if !d.is_completed(self.grammar()) {
            match d.next_symbol(self.grammar()) {
                Symbol::Token(tidx) => self.match_terminal(d, tidx),
                Symbol::Rule(ridx) => {
                    let (right_extents, represented) = self.completed_neighbours(ridx, d.right);
                    if right_extents.is_empty() {
                        self.descend(ridx, d.right);
                    } else {
                        self.requeue_unrepresented(ridx, d.right, &represented);
                        self.skip(d.advance(), &right_extents);
                    }
                }
            }
        } else {
            let ridx = self.grammar().prod_rule(d.pidx);
            let targets = self.ascend_targets(ridx, d.left);
            self.ascend(targets, d.right);
            if d.is_empty(self.grammar()) {
                self.push_epn(Epn::zero_width(&d));
            }
        }
    }
}

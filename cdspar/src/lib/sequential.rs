//! The single-threaded reference engine: one worklist, processed to
//! exhaustion. The parallel engines must produce exactly the sets this
//! engine produces.

use std::collections::{HashSet, VecDeque};

use cdsgrammar::{CdsGrammar, PIdx, RIdx, Symbol, TIdx};

use crate::{
    descriptor::Descriptor,
    engine::EngineCore,
    epn::Epn,
    parser::{ActionCounts, ParseOutput, ParseStats},
    DescriptorSet, EpnSet,
};

pub(crate) fn parse(grm: &CdsGrammar, input: &[Option<TIdx>]) -> ParseOutput {
    let mut run = SequentialRun {
        grm,
        input,
        worklist: VecDeque::new(),
        descriptors: DescriptorSet::new(),
        epns: EpnSet::new(),
        counts: ActionCounts::default(),
    };
    run.seed_worklist();
    let mut processed = 0;
    while let Some(d) = run.worklist.pop_front() {
        // Admission: insertion into the descriptor set must precede
        // processing, and a descriptor already present has been processed.
        if !run.descriptors.insert(d) {
            continue;
        }
        run.process_descriptor(d);
        processed += 1;
    }
    ParseOutput {
        descriptors: run.descriptors,
        epns: run.epns,
        stats: ParseStats {
            processed,
            workers: 1,
            actions: run.counts.snapshot(),
            busy_histogram: Vec::new(),
        },
    }
}

struct SequentialRun<'a> {
    grm: &'a CdsGrammar,
    input: &'a [Option<TIdx>],
    worklist: VecDeque<Descriptor>,
    descriptors: DescriptorSet,
    epns: EpnSet,
    counts: ActionCounts,
}

impl EngineCore for SequentialRun<'_> {
    fn grammar(&self) -> &CdsGrammar {
        self.grm
    }

    fn input(&self) -> &[Option<TIdx>] {
        self.input
    }

    fn counts(&self) -> &ActionCounts {
        &self.counts
    }

    fn completed_neighbours(&mut self, ridx: RIdx, at: usize) -> (HashSet<usize>, Vec<PIdx>) {
        let mut right_extents = HashSet::new();
        let mut represented = Vec::new();
        for d in &self.descriptors {
            if d.left == at && d.is_completed(self.grm) && self.grm.prod_rule(d.pidx) == ridx {
                right_extents.insert(d.right);
                if !represented.contains(&d.pidx) {
                    represented.push(d.pidx);
                }
            }
        }
        (right_extents, represented)
    }

    fn ascend_targets(&mut self, ridx: RIdx, left: usize) -> Vec<Descriptor> {
        let mut targets = Vec::new();
        for d in &self.descriptors {
            if d.right == left
                && !d.is_completed(self.grm)
                && d.next_symbol(self.grm) == Symbol::Rule(ridx)
            {
                targets.push(d.advance());
            }
        }
        targets
    }

    fn push_descriptor(&mut self, d: Descriptor) {
        if !self.descriptors.contains(&d) {
            self.worklist.push_back(d);
        }
    }

    fn push_epn(&mut self, e: Epn) {
        self.epns.insert(e);
    }
}

#[cfg(test)]
mod test {
    use crate::{check_output, CdsParserBuilder, Descriptor, Epn, ParseOutput};
    use cdsgrammar::{parse_grammar, CdsGrammar, PIdx, SIdx};

    fn run(grammar: &str, input: &[&str]) -> (CdsGrammar, ParseOutput) {
        let (grm, _) = parse_grammar(grammar).unwrap();
        let out = CdsParserBuilder::new(&grm).parse(input);
        (grm, out)
    }

    fn prod(grm: &CdsGrammar, lhs: &str, off: usize) -> PIdx {
        grm.rule_prods(grm.rule_idx(lhs).unwrap())[off]
    }

    #[test]
    fn test_single_terminal() {
        let (grm, out) = run("S a", &["a"]);
        let pidx = prod(&grm, "S", 0);
        assert!(out
            .descriptors
            .contains(&Descriptor::new(pidx, SIdx(1), 0, 1)));
        assert!(out.epns.contains(&Epn {
            pidx,
            dot: SIdx(1),
            left: 0,
            pivot: 0,
            right: 1
        }));
        assert!(out.accepted(&grm, 1));
        assert!(check_output(&grm, &["a"], &out.descriptors, &out.epns).is_empty());
    }

    #[test]
    fn test_empty_production() {
        let (grm, out) = run("S", &[]);
        let pidx = prod(&grm, "S", 0);
        assert!(out
            .descriptors
            .contains(&Descriptor::new(pidx, SIdx(0), 0, 0)));
        assert!(out.epns.contains(&Epn {
            pidx,
            dot: SIdx(0),
            left: 0,
            pivot: 0,
            right: 0
        }));
        assert!(out.accepted(&grm, 0));
        assert!(check_output(&grm, &[], &out.descriptors, &out.epns).is_empty());
    }

    #[test]
    fn test_left_recursion_terminates() {
        let (grm, out) = run(
            "S S a
             S a",
            &["a", "a", "a"],
        );
        let pidx = prod(&grm, "S", 0);
        assert!(out
            .descriptors
            .contains(&Descriptor::new(pidx, SIdx(2), 0, 3)));
        assert!(out.accepted(&grm, 3));
        assert!(check_output(&grm, &["a", "a", "a"], &out.descriptors, &out.epns).is_empty());
    }

    #[test]
    fn test_ambiguity_yields_distinct_pivots() {
        let (grm, out) = run(
            "E E E
             E a",
            &["a", "a", "a"],
        );
        let pidx = prod(&grm, "E", 0);
        // "a a a" derives as (a a)(a) and (a)(a a): the completed slot over
        // the whole input must appear with more than one pivot.
        let pivots = out
            .epns
            .iter()
            .filter(|e| e.pidx == pidx && e.dot == SIdx(2) && e.left == 0 && e.right == 3)
            .map(|e| e.pivot)
            .collect::<std::collections::HashSet<_>>();
        assert!(pivots.len() >= 2);
        assert!(out.accepted(&grm, 3));
        assert!(check_output(&grm, &["a", "a", "a"], &out.descriptors, &out.epns).is_empty());
    }

    #[test]
    fn test_non_match() {
        let (grm, out) = run("S a", &["b"]);
        assert!(!out.accepted(&grm, 1));
        assert_eq!(out.descriptors.len(), 1);
        assert!(out.epns.is_empty());
    }

    #[test]
    fn test_empty_input_without_empty_rule() {
        let (grm, out) = run("S a", &[]);
        assert!(!out.accepted(&grm, 0));
    }

    #[test]
    fn test_purely_left_recursive_grammar_terminates() {
        // No base case: nothing can ever complete, but the descend into the
        // cycle must be deduplicated rather than looping.
        let (grm, out) = run("S S a", &["a"]);
        assert!(!out.accepted(&grm, 1));
        assert_eq!(out.descriptors.len(), 1);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let grammar = "S S a
                       S a";
        let (grm, out1) = run(grammar, &["a", "a", "a", "a"]);
        let out2 = CdsParserBuilder::new(&grm).parse(&["a", "a", "a", "a"]);
        assert_eq!(out1.descriptors, out2.descriptors);
        assert_eq!(out1.epns, out2.epns);
        assert_eq!(out1.stats.processed, out2.stats.processed);
    }

    #[test]
    fn test_action_counts_are_recorded() {
        let (_, out) = run("S a", &["a"]);
        let [matches, descends, skips, ascends] = out.stats.actions;
        // Seeding does not count as a descend; the single production is
        // matched once and its completion ascends once.
        assert_eq!(descends, 0);
        assert_eq!(matches, 1);
        assert_eq!(skips, 0);
        assert_eq!(ascends, 1);
    }
}

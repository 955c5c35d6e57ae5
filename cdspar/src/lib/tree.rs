//! The tree engine: workers spawn further workers whenever their private
//! worklist outgrows a threshold, handing each child one descriptor and a
//! snapshot of their private descriptor set.
//!
//! Private snapshots under-approximate the global descriptor set `G`: they
//! may lack descriptors admitted concurrently by workers in other subtrees.
//! Admission is therefore finalized by the insert into `G` (under its write
//! lock), which also orders every admission before the admitting worker's
//! neighbour scans; scans read `G`, so for any pair of descriptors whose
//! actions concern each other at least one scan observes the other
//! descriptor. The private set only pre-filters worklist pushes.
//!
//! A skip consults completed descriptors discovered so far, and productions
//! of the skipped nonterminal without a completed representative at that
//! point are re-queued as forced start descriptors: `force` bypasses the
//! already-in-`G` check so the descriptor is reprocessed against the richer
//! current state. A shared ledger grants each descriptor value at most one
//! such override, which keeps reprocessing finite.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, RwLock,
    },
    thread,
};

use cdsgrammar::{CdsGrammar, PIdx, RIdx, Symbol, TIdx};

use crate::{
    descriptor::Descriptor,
    engine::EngineCore,
    epn::Epn,
    parser::{ActionCounts, ParseOutput, ParseStats},
    DescriptorSet, EpnSet,
};

struct TreeShared<'a> {
    grm: &'a CdsGrammar,
    input: &'a [Option<TIdx>],
    global: RwLock<DescriptorSet>,
    epns: Mutex<EpnSet>,
    /// Descriptor values already granted their one forced reprocessing.
    forced_once: Mutex<DescriptorSet>,
    threshold: usize,
    workers: AtomicUsize,
    processed: AtomicUsize,
    counts: ActionCounts,
}

pub(crate) fn parse(grm: &CdsGrammar, input: &[Option<TIdx>], threshold: usize) -> ParseOutput {
    let shared = TreeShared {
        grm,
        input,
        global: RwLock::new(DescriptorSet::new()),
        epns: Mutex::new(EpnSet::new()),
        forced_once: Mutex::new(DescriptorSet::new()),
        threshold: threshold.max(2),
        workers: AtomicUsize::new(0),
        processed: AtomicUsize::new(0),
        counts: ActionCounts::default(),
    };

    let seeds = grm
        .rule_prods(grm.start_rule_idx())
        .iter()
        .map(|&pidx| Descriptor::start(pidx, 0))
        .collect::<Vec<_>>();
    let snapshot = seeds.iter().copied().collect::<DescriptorSet>();

    thread::scope(|scope| {
        for &seed in &seeds {
            spawn_worker(scope, &shared, seed, snapshot.clone());
        }
    });

    ParseOutput {
        descriptors: shared.global.into_inner().unwrap(),
        epns: shared.epns.into_inner().unwrap(),
        stats: ParseStats {
            processed: shared.processed.load(Ordering::Acquire),
            workers: shared.workers.load(Ordering::Acquire),
            actions: shared.counts.snapshot(),
            busy_histogram: Vec::new(),
        },
    }
}

fn spawn_worker<'scope, 'env>(
    scope: &'scope thread::Scope<'scope, 'env>,
    shared: &'env TreeShared<'env>,
    seed: Descriptor,
    snapshot: DescriptorSet,
) {
    shared.workers.fetch_add(1, Ordering::AcqRel);
    scope.spawn(move || {
        TreeWorker {
            scope,
            shared,
            worklist: vec![seed],
            local: snapshot,
        }
        .run()
    });
}

struct TreeWorker<'scope, 'env: 'scope> {
    scope: &'scope thread::Scope<'scope, 'env>,
    shared: &'env TreeShared<'env>,
    worklist: Vec<Descriptor>,
    local: DescriptorSet,
}

impl TreeWorker<'_, '_> {
    fn run(mut self) {
        while !self.worklist.is_empty() {
            if self.worklist.len() >= self.shared.threshold {
                // Hand all but threshold-1 items to fresh child workers,
                // each with a copy of what this worker has seen so far.
                let surplus = self.worklist.len() - self.shared.threshold + 1;
                for d in self.worklist.drain(..surplus) {
                    spawn_worker(self.scope, self.shared, d, self.local.clone());
                }
            }
            let d = match self.worklist.pop() {
                Some(d) => d,
                None => break,
            };
            let plain = Descriptor::new(d.pidx, d.dot, d.left, d.right);
            self.local.insert(plain);
            let admitted = self.shared.global.write().unwrap().insert(plain);
            if admitted || d.force {
                self.process_descriptor(plain);
                self.shared.processed.fetch_add(1, Ordering::AcqRel);
            }
        }
        // Children are joined by the scope the engine runs under.
    }
}

impl EngineCore for TreeWorker<'_, '_> {
    fn grammar(&self) -> &CdsGrammar {
        self.shared.grm
    }

    fn input(&self) -> &[Option<TIdx>] {
        self.shared.input
    }

    fn counts(&self) -> &ActionCounts {
        &self.shared.counts
    }

    fn completed_neighbours(&mut self, ridx: RIdx, at: usize) -> (HashSet<usize>, Vec<PIdx>) {
        let grm = self.shared.grm;
        let mut right_extents = HashSet::new();
        let mut represented = Vec::new();
        for d in self.shared.global.read().unwrap().iter() {
            if d.left == at && d.is_completed(grm) && grm.prod_rule(d.pidx) == ridx {
                right_extents.insert(d.right);
                if !represented.contains(&d.pidx) {
                    represented.push(d.pidx);
                }
            }
        }
        (right_extents, represented)
    }

    fn ascend_targets(&mut self, ridx: RIdx, left: usize) -> Vec<Descriptor> {
        let grm = self.shared.grm;
        let mut targets = Vec::new();
        for d in self.shared.global.read().unwrap().iter() {
            if d.right == left && !d.is_completed(grm) && d.next_symbol(grm) == Symbol::Rule(ridx) {
                targets.push(d.advance());
            }
        }
        targets
    }

    fn push_descriptor(&mut self, d: Descriptor) {
        if !self.local.contains(&d) {
            self.worklist.push(d);
        }
    }

    fn push_epn(&mut self, e: Epn) {
        self.shared.epns.lock().unwrap().insert(e);
    }

    fn requeue_unrepresented(&mut self, ridx: RIdx, at: usize, represented: &[PIdx]) {
        for &pidx in self.shared.grm.rule_prods(ridx) {
            if represented.contains(&pidx) {
                continue;
            }
            let d = Descriptor::start(pidx, at);
            if self.shared.forced_once.lock().unwrap().insert(d) {
                self.local.remove(&d);
                self.worklist.push(d.forced());
            }
        }
    }
}

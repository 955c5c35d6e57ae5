//! The pool engine: a coordinator thread distributing work round-robin over
//! a fixed set of workers, each with its own queue.
//!
//! New descriptors produced by workers go to a global staging queue; only
//! the coordinator moves them onwards to worker queues. Termination is
//! declared when, in one observation made under the staging queue's lock,
//! the staging queue and every worker queue are empty and no worker is mid-
//! descriptor. Workers push produced work to the staging queue *before*
//! decrementing the busy counter, so a zero busy count implies all produced
//! work is visible to that observation.
//!
//! A descriptor is inserted into the shared descriptor set (under the write
//! lock) before its neighbour scans run; for any pair of descriptors whose
//! actions concern each other, at least one of the two scans therefore
//! observes the other descriptor. Membership checks made at production time
//! use only a read lock and are merely a hint: admission under the write
//! lock is what prevents reprocessing.

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Condvar, Mutex, RwLock,
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

struct WorkerQueue {
    items: Mutex<VecDeque<Descriptor>>,
    cond: Condvar,
}

struct PoolShared<'a> {
    grm: &'a CdsGrammar,
    input: &'a [Option<TIdx>],
    descriptors: RwLock<DescriptorSet>,
    epns: Mutex<EpnSet>,
    staging: Mutex<Vec<Descriptor>>,
    queues: Vec<WorkerQueue>,
    working: AtomicUsize,
    stop: AtomicBool,
    processed: AtomicUsize,
    counts: ActionCounts,
}

pub(crate) fn parse(grm: &CdsGrammar, input: &[Option<TIdx>], workers: usize) -> ParseOutput {
    let workers = workers.max(1);
    let shared = PoolShared {
        grm,
        input,
        descriptors: RwLock::new(DescriptorSet::new()),
        epns: Mutex::new(EpnSet::new()),
        staging: Mutex::new(
            grm.rule_prods(grm.start_rule_idx())
                .iter()
                .map(|&pidx| Descriptor::start(pidx, 0))
                .collect(),
        ),
        queues: (0..workers)
            .map(|_| WorkerQueue {
                items: Mutex::new(VecDeque::new()),
                cond: Condvar::new(),
            })
            .collect(),
        working: AtomicUsize::new(0),
        stop: AtomicBool::new(false),
        processed: AtomicUsize::new(0),
        counts: ActionCounts::default(),
    };
    let mut busy_histogram = vec![0usize; workers + 1];

    thread::scope(|scope| {
        for id in 0..workers {
            let shared = &shared;
            scope.spawn(move || worker_loop(shared, id));
        }

        let mut cursor = 0;
        loop {
            let mut staging = shared.staging.lock().unwrap();
            busy_histogram[shared.working.load(Ordering::Acquire)] += 1;
            if staging.is_empty() {
                let queues_empty = shared
                    .queues
                    .iter()
                    .all(|q| q.items.lock().unwrap().is_empty());
                if queues_empty && shared.working.load(Ordering::Acquire) == 0 {
                    break;
                }
                drop(staging);
                thread::yield_now();
                continue;
            }
            for d in staging.drain(..) {
                let q = &shared.queues[cursor];
                q.items.lock().unwrap().push_back(d);
                q.cond.notify_one();
                cursor = (cursor + 1) % workers;
            }
        }

        shared.stop.store(true, Ordering::Release);
        for q in &shared.queues {
            q.cond.notify_all();
        }
    });

    ParseOutput {
        descriptors: shared.descriptors.into_inner().unwrap(),
        epns: shared.epns.into_inner().unwrap(),
        stats: ParseStats {
            processed: shared.processed.load(Ordering::Acquire),
            workers,
            actions: shared.counts.snapshot(),
            busy_histogram,
        },
    }
}

fn worker_loop(shared: &PoolShared, id: usize) {
    let q = &shared.queues[id];
    loop {
        let mut items = q.items.lock().unwrap();
        while items.is_empty() && !shared.stop.load(Ordering::Acquire) {
            items = q.cond.wait(items).unwrap();
        }
        if shared.stop.load(Ordering::Acquire) {
            break;
        }
        let d = match items.pop_front() {
            Some(d) => {
                shared.working.fetch_add(1, Ordering::AcqRel);
                d
            }
            None => continue,
        };
        drop(items);

        let admitted = shared.descriptors.write().unwrap().insert(d);
        if admitted {
            PoolWorker { shared }.process_descriptor(d);
            shared.processed.fetch_add(1, Ordering::AcqRel);
        }
        shared.working.fetch_sub(1, Ordering::AcqRel);
    }
}

struct PoolWorker<'s, 'a> {
    shared: &'s PoolShared<'a>,
}

impl EngineCore for PoolWorker<'_, '_> {
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
        for d in self.shared.descriptors.read().unwrap().iter() {
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
        for d in self.shared.descriptors.read().unwrap().iter() {
            if d.right == left && !d.is_completed(grm) && d.next_symbol(grm) == Symbol::Rule(ridx) {
                targets.push(d.advance());
            }
        }
        targets
    }

    fn push_descriptor(&mut self, d: Descriptor) {
        let seen = self.shared.descriptors.read().unwrap().contains(&d);
        if !seen {
            self.shared.staging.lock().unwrap().push(d);
        }
    }

    fn push_epn(&mut self, e: Epn) {
        self.shared.epns.lock().unwrap().insert(e);
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};

use cdsgrammar::{CdsGrammar, SIdx, TIdx};

use crate::{descriptor::Descriptor, pool, sequential, tree, DescriptorSet, EpnSet};

/// The available engines. All three produce the same descriptor and node
/// sets for a given grammar and input; they differ only in how the worklist
/// is processed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineKind {
    /// A single-threaded worklist loop.
    Sequential,
    /// A coordinator distributing work round-robin over a fixed pool of
    /// worker threads.
    Pool,
    /// Worker threads which spawn further workers whenever their local
    /// worklist grows beyond a threshold.
    Tree,
}

/// Counts of the four actions applied during a parse, shared between
/// workers.
#[derive(Debug, Default)]
pub(crate) struct ActionCounts {
    matches: AtomicUsize,
    descends: AtomicUsize,
    skips: AtomicUsize,
    ascends: AtomicUsize,
}

impl ActionCounts {
    pub(crate) fn inc_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_descend(&self) {
        self.descends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_skip(&self) {
        self.skips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_ascend(&self) {
        self.ascends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> [usize; 4] {
        [
            self.matches.load(Ordering::Relaxed),
            self.descends.load(Ordering::Relaxed),
            self.skips.load(Ordering::Relaxed),
            self.ascends.load(Ordering::Relaxed),
        ]
    }
}

/// Execution data gathered alongside a parse.
#[derive(Clone, Debug)]
pub struct ParseStats {
    /// How many descriptors were admitted and processed.
    pub processed: usize,
    /// How many workers the engine used (1 for the sequential engine; for
    /// the tree engine, how many were spawned in total).
    pub workers: usize,
    /// How often each of match, descend, skip, and ascend was applied, in
    /// that order.
    pub actions: [usize; 4],
    /// For the pool engine: how often the coordinator observed `k` busy
    /// workers, for each `k` in `0..=workers`. Empty for the other engines.
    pub busy_histogram: Vec<usize>,
}

/// The result of a parse: the full descriptor set, the set of extended
/// packed nodes, and execution data.
#[derive(Debug)]
pub struct ParseOutput {
    pub descriptors: DescriptorSet,
    pub epns: EpnSet,
    pub stats: ParseStats,
}

impl ParseOutput {
    /// Was an input of length `input_len` recognized? True iff some
    /// production of the start rule was completed over the whole input.
    pub fn accepted(&self, grm: &CdsGrammar, input_len: usize) -> bool {
        grm.rule_prods(grm.start_rule_idx()).iter().any(|&pidx| {
            let end = SIdx::from(grm.prod(pidx).len());
            self.descriptors
                .contains(&Descriptor::new(pidx, end, 0, input_len))
        })
    }
}

/// Map input tokens to token indices once per parse. Tokens absent from the
/// grammar can never match and so map to `None` rather than being rejected.
pub(crate) fn map_input(grm: &CdsGrammar, input: &[&str]) -> Vec<Option<TIdx>> {
    input.iter().map(|t| grm.token_idx(t)).collect()
}

/// Build a parser for a grammar and run it over inputs.
///
/// ```text
/// let out = CdsParserBuilder::new(&grm)
///     .engine(EngineKind::Pool)
///     .workers(8)
///     .parse(&["a", "a", "a"]);
/// ```
pub struct CdsParserBuilder<'a> {
    grm: &'a CdsGrammar,
    engine: EngineKind,
    workers: usize,
    spawn_threshold: usize,
}

impl<'a> CdsParserBuilder<'a> {
    /// Create a new builder defaulting to the sequential engine, 16 workers
    /// (pool), and a spawn threshold of 32 (tree).
    pub fn new(grm: &'a CdsGrammar) -> Self {
        CdsParserBuilder {
            grm,
            engine: EngineKind::Sequential,
            workers: 16,
            spawn_threshold: 32,
        }
    }

    pub fn engine(mut self, kind: EngineKind) -> Self {
        self.engine = kind;
        self
    }

    /// Set the pool engine's worker count. Clamped to at least 1.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Set the tree engine's worklist size threshold above which workers
    /// hand surplus items to freshly spawned children. Clamped to at least
    /// 2, since each spawn must leave the spawning worker an item of its
    /// own.
    pub fn spawn_threshold(mut self, n: usize) -> Self {
        self.spawn_threshold = n.max(2);
        self
    }

    /// Run the selected engine over `input`, a sequence of terminal symbols.
    pub fn parse(&self, input: &[&str]) -> ParseOutput {
        let toks = map_input(self.grm, input);
        match self.engine {
            EngineKind::Sequential => sequential::parse(self.grm, &toks),
            EngineKind::Pool => pool::parse(self.grm, &toks, self.workers),
            EngineKind::Tree => tree::parse(self.grm, &toks, self.spawn_threshold),
        }
    }
}

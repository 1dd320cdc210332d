use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::output::{Emitter, Pattern};
use crate::problem::Problem;
use crate::solver::Solver;

/// Counters of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Transactions left after dropping unpromising items.
    pub transactions: u64,
    /// Items whose TWU meets the threshold.
    pub promising_items: u64,
    /// Extensions projected.
    pub candidates: u64,
    /// Projected transactions folded into another one.
    pub merges: u64,
    /// Extensions abandoned because an earlier item belongs to their closure.
    pub backward_pruned: u64,
    /// Subtrees replaced by emitting their closure directly.
    pub closure_jumps: u64,
    /// Most merged transactions alive at once in one search worker.
    pub peak_merged: u64,
    pub patterns: u64,
    pub elapsed: Duration,
}

impl Stats {
    fn absorb(&mut self, other: &Stats) {
        self.candidates += other.candidates;
        self.merges += other.merges;
        self.backward_pruned += other.backward_pruned;
        self.closure_jumps += other.closure_jumps;
        self.peak_merged = self.peak_merged.max(other.peak_merged);
        self.patterns += other.patterns;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "transactions:    {}", self.transactions)?;
        writeln!(f, "promising items: {}", self.promising_items)?;
        writeln!(f, "candidates:      {}", self.candidates)?;
        writeln!(f, "merges:          {}", self.merges)?;
        writeln!(f, "backward pruned: {}", self.backward_pruned)?;
        writeln!(f, "closure jumps:   {}", self.closure_jumps)?;
        writeln!(f, "peak merged:     {}", self.peak_merged)?;
        writeln!(f, "patterns:        {}", self.patterns)?;
        write!(f, "elapsed:         {:.3}s", self.elapsed.as_secs_f64())
    }
}

/// Mines closed high-utility itemsets.
///
/// # Example
///
/// ```
/// use closed_huim::{Dataset, Emitter, Miner, Options};
///
/// let dataset: Dataset = closed_huim::dataset! {
///     {1 => 2, 2 => 3},
///     {2 => 2, 3 => 2},
///     {1 => 2, 2 => 3, 3 => 2},
/// };
/// let mut emitter = Emitter::in_memory();
/// let stats = Miner::new(Options::default())
///     .mine_into(&dataset, 6, &mut emitter)
///     .unwrap();
/// assert_eq!(stats.patterns, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Miner {
    options: Options,
}

impl Miner {
    pub fn new(options: Options) -> Self {
        Miner { options }
    }

    /// Sends every closed itemset of `dataset` with utility at least `min_utility` to `emitter`.
    pub fn mine_into(
        &self,
        dataset: &Dataset,
        min_utility: u64,
        emitter: &mut Emitter,
    ) -> Result<Stats> {
        if min_utility == 0 {
            return Err(Error::InvalidParameter(
                "minimum utility must be positive".to_string(),
            ));
        }
        self.options.validate()?;

        let started = Instant::now();
        let problem = Problem::new(dataset, min_utility);

        let mut stats = if self.options.parallel {
            self.search_parallel(&problem, emitter)?
        } else {
            self.search(&problem, emitter)?
        };
        stats.transactions = problem.transactions().len() as u64;
        stats.promising_items = problem.items().len() as u64;
        stats.elapsed = started.elapsed();

        log::info!(
            "found {} closed itemsets with utility >= {} in {:.3}s",
            stats.patterns,
            min_utility,
            stats.elapsed.as_secs_f64()
        );
        Ok(stats)
    }

    fn search(&self, problem: &Problem, emitter: &mut Emitter) -> Result<Stats> {
        let mut solver = Solver::new(problem, &self.options);
        let mut root = solver.root();

        for ix in 0..root.primary().len() {
            if self.options.is_cancelled() {
                return Err(Error::Cancelled);
            }
            solver.branch(&mut root, ix, emitter)?;
        }
        Ok(solver.stats().clone())
    }

    fn search_parallel(&self, problem: &Problem, emitter: &mut Emitter) -> Result<Stats> {
        let root = Solver::new(problem, &self.options).root();

        let branches = (0..root.primary().len())
            .into_par_iter()
            .map(|ix| {
                if self.options.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let mut solver = Solver::new(problem, &self.options);
                let mut found: Vec<Pattern> = Vec::new();
                solver.detached_branch(&root, ix, &mut found)?;
                Ok((found, solver.stats().clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stats = Stats::default();
        for (found, branch_stats) in branches {
            stats.absorb(&branch_stats);
            for pattern in found {
                emitter.emit(pattern)?;
            }
        }
        Ok(stats)
    }
}

/// Collects every closed itemset of `dataset` with utility at least `min_utility`.
pub fn mine(dataset: &Dataset, min_utility: u64, options: &Options) -> Result<Vec<Pattern>> {
    let mut emitter = Emitter::in_memory();
    Miner::new(options.clone()).mine_into(dataset, min_utility, &mut emitter)?;
    Ok(emitter.finish()?.unwrap_or_default())
}

/// Mines the dataset stored at `input`.
///
/// With an `output` path the patterns are written there, one per line, and `None` is returned.
/// Otherwise they are collected and returned.
pub fn run_search(
    min_utility: u64,
    input: impl AsRef<Path>,
    output: Option<&Path>,
    options: &Options,
) -> Result<Option<Vec<Pattern>>> {
    let input = input.as_ref();
    if input.as_os_str().is_empty() {
        return Err(Error::InvalidParameter("input path is empty".to_string()));
    }
    if output.is_some_and(|path| path.as_os_str().is_empty()) {
        return Err(Error::InvalidParameter("output path is empty".to_string()));
    }
    options.validate()?;

    let dataset = Dataset::load(input, options.max_transactions)?;
    let mut emitter = match output {
        Some(path) => Emitter::to_file(path)?,
        None => Emitter::in_memory(),
    };
    Miner::new(options.clone()).mine_into(&dataset, min_utility, &mut emitter)?;
    emitter.finish()
}

use crate::bounds::BoundTable;
use crate::error::Result;
use crate::miner::Stats;
use crate::options::Options;
use crate::output::{Emitter, Pattern};
use crate::problem::Problem;
use crate::projection::{project, Merger};
use crate::transaction::Projected;

/// Receives the patterns found by a [`Solver`].
pub(crate) trait Sink {
    fn accept(&mut self, pattern: Pattern) -> Result<()>;
}

impl Sink for Emitter {
    fn accept(&mut self, pattern: Pattern) -> Result<()> {
        self.emit(pattern)
    }
}

impl Sink for Vec<Pattern> {
    fn accept(&mut self, pattern: Pattern) -> Result<()> {
        self.push(pattern);
        Ok(())
    }
}

/// A node of the search tree: an itemset and everything needed to extend it.
///
/// The merged transactions of `db` belong to the frame and are released when it is popped,
/// once the frames below it are gone too.
pub(crate) struct Frame<'a> {
    db: Vec<Projected<'a>>,
    // search position of every `db` entry, advanced as candidates are projected
    cursors: Vec<usize>,
    // candidates to recurse into, ascending
    primary: Vec<u32>,
    // items allowed in extensions, ascending, a superset of `primary`
    secondary: Vec<u32>,
    next: usize,
    // largest support among the extensions projected so far
    max_support: u64,
    utility: u64,
    support: u64,
    // merged transactions built for `db`
    built: u64,
}

impl<'a> Frame<'a> {
    fn new(db: Vec<Projected<'a>>, primary: Vec<u32>, secondary: Vec<u32>) -> Self {
        let cursors = db.iter().map(|entry| entry.start()).collect();
        Frame {
            db,
            cursors,
            primary,
            secondary,
            next: 0,
            max_support: 0,
            utility: 0,
            support: 0,
            built: 0,
        }
    }

    pub(crate) fn primary(&self) -> &[u32] {
        &self.primary
    }
}

/// Outcome of projecting one candidate.
struct Expansion<'a> {
    support: u64,
    child: Option<Frame<'a>>,
}

/// Depth-first search over the itemsets of one [`Problem`].
pub(crate) struct Solver<'p> {
    problem: &'p Problem,
    options: &'p Options,
    bounds: BoundTable,
    prefix: Vec<u32>,
    // merged transactions held by the frames on the stack
    live_merged: u64,
    stats: Stats,
}

impl<'p> Solver<'p> {
    pub(crate) fn new(problem: &'p Problem, options: &'p Options) -> Self {
        Solver {
            problem,
            options,
            bounds: BoundTable::new(problem.items().len()),
            prefix: Vec::new(),
            live_merged: 0,
            stats: Stats::default(),
        }
    }

    pub(crate) fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The node of the empty itemset.
    pub(crate) fn root(&mut self) -> Frame<'p> {
        let db: Vec<Projected<'p>> = self
            .problem
            .transactions()
            .iter()
            .map(Projected::whole)
            .collect();
        let items: Vec<u32> = (0..self.problem.items().len() as u32).collect();
        self.bounds.refresh(&db, &items);

        let secondary = self.secondary(&items);
        let primary = self.primary(&secondary);
        Frame::new(db, primary, secondary)
    }

    /// Explores every itemset starting with the `ix`-th root candidate.
    ///
    /// Branches of one root must be explored in ascending order since they share its cursors.
    pub(crate) fn branch<S: Sink>(
        &mut self,
        root: &mut Frame<'p>,
        ix: usize,
        sink: &mut S,
    ) -> Result<()> {
        let item = root.primary[ix];
        self.explore(&root.db, &mut root.cursors, &root.secondary, item, sink)
    }

    /// Like [`Solver::branch`], with cursors of its own so branches can run in any order.
    pub(crate) fn detached_branch<S: Sink>(
        &mut self,
        root: &Frame<'p>,
        ix: usize,
        sink: &mut S,
    ) -> Result<()> {
        let mut cursors = root.cursors.clone();
        let item = root.primary[ix];
        self.explore(&root.db, &mut cursors, &root.secondary, item, sink)
    }

    fn explore<S: Sink>(
        &mut self,
        db: &[Projected<'p>],
        cursors: &mut [usize],
        secondary: &[u32],
        item: u32,
        sink: &mut S,
    ) -> Result<()> {
        log::debug!(
            "exploring itemsets starting with item {}",
            self.problem.items().original(item)
        );
        let expansion = self.expand(db, cursors, secondary, item, sink)?;
        match expansion.child {
            Some(child) => self.walk(child, sink),
            None => Ok(()),
        }
    }

    fn walk<S: Sink>(&mut self, first: Frame<'p>, sink: &mut S) -> Result<()> {
        let min_utility = self.problem.min_utility();
        self.hold(&first);
        let mut stack = vec![first];

        while let Some(frame) = stack.last_mut() {
            let Some(&item) = frame.primary.get(frame.next) else {
                // no candidate left: the itemset is closed unless an extension kept its support
                if frame.support > frame.max_support && frame.utility >= min_utility {
                    self.emit(&[], frame.utility, sink)?;
                }
                self.live_merged -= frame.built;
                self.prefix.pop();
                stack.pop();
                continue;
            };
            frame.next += 1;

            let expansion = self.expand(
                &frame.db,
                &mut frame.cursors,
                &frame.secondary,
                item,
                sink,
            )?;
            frame.max_support = frame.max_support.max(expansion.support);

            if let Some(child) = expansion.child {
                self.hold(&child);
                stack.push(child);
            }
        }

        Ok(())
    }

    fn hold(&mut self, frame: &Frame<'p>) {
        self.live_merged += frame.built;
        self.stats.peak_merged = self.stats.peak_merged.max(self.live_merged);
    }

    /// Extends the current prefix by `item`.
    ///
    /// On `Some` child the prefix keeps `item`, and it must be popped once the child is done.
    fn expand<S: Sink>(
        &mut self,
        db: &[Projected<'p>],
        cursors: &mut [usize],
        secondary: &[u32],
        item: u32,
        sink: &mut S,
    ) -> Result<Expansion<'p>> {
        self.stats.candidates += 1;

        let projection = project(db, cursors, item, Merger::new(self.options.merge_cap()));
        self.stats.merges += projection.merged;
        let support = projection.support;

        if support == 0 {
            return Ok(Expansion {
                support,
                child: None,
            });
        }

        if self
            .problem
            .has_backward_extension(&self.prefix, item, &projection.covered)
        {
            self.stats.backward_pruned += 1;
            return Ok(Expansion {
                support,
                child: None,
            });
        }

        let tail = &secondary[secondary.partition_point(|&i| i <= item)..];
        self.bounds.refresh(&projection.db, tail);
        let secondary = self.secondary(tail);

        self.prefix.push(item);

        let closure = self.closure_utility(&projection.db, projection.utility, support, &secondary);
        if let Some(utility) = closure {
            if !secondary.is_empty() {
                self.stats.closure_jumps += 1;
            }
            if utility >= self.problem.min_utility() {
                self.emit(&secondary, utility, sink)?;
            }
            self.prefix.pop();
            return Ok(Expansion {
                support,
                child: None,
            });
        }

        let primary = self.primary(&secondary);
        let mut child = Frame::new(projection.db, primary, secondary);
        child.utility = projection.utility;
        child.support = support;
        child.built = projection.built;

        Ok(Expansion {
            support,
            child: Some(child),
        })
    }

    fn secondary(&self, items: &[u32]) -> Vec<u32> {
        let min_utility = self.problem.min_utility();
        items
            .iter()
            .copied()
            .filter(|&item| self.bounds.local(item) >= min_utility)
            .collect()
    }

    fn primary(&self, secondary: &[u32]) -> Vec<u32> {
        if !self.options.subtree_pruning {
            return secondary.to_vec();
        }
        let min_utility = self.problem.min_utility();
        secondary
            .iter()
            .copied()
            .filter(|&item| self.bounds.subtree(item) >= min_utility)
            .collect()
    }

    /// Utility of the prefix together with all of `secondary`, if they are forced into its
    /// closure: every one of them occurs in each record of the prefix.
    fn closure_utility(
        &self,
        db: &[Projected<'_>],
        utility: u64,
        support: u64,
        secondary: &[u32],
    ) -> Option<u64> {
        if !self.options.closure_jumping {
            return None;
        }
        if secondary.iter().any(|&item| self.bounds.support(item) != support) {
            return None;
        }

        let mut total = utility;
        for entry in db {
            for (item, &item_utility) in entry.items().iter().zip(entry.utilities()) {
                if secondary.binary_search(item).is_ok() {
                    total += item_utility;
                }
            }
        }
        Some(total)
    }

    fn emit<S: Sink>(&mut self, extra: &[u32], utility: u64, sink: &mut S) -> Result<()> {
        let items = self.problem.items();
        let pattern = Pattern::new(
            self.prefix
                .iter()
                .chain(extra)
                .map(|&item| items.original(item))
                .collect(),
            utility,
        );
        self.stats.patterns += 1;
        sink.accept(pattern)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(solver: &mut Solver) -> Vec<Pattern> {
        let mut root = solver.root();
        let mut found: Vec<Pattern> = Vec::new();
        for ix in 0..root.primary().len() {
            solver.branch(&mut root, ix, &mut found).unwrap();
        }
        found
    }

    fn mine(problem: &Problem, options: &Options) -> Vec<(Vec<u32>, u64)> {
        let mut solver = Solver::new(problem, options);
        let mut found: Vec<(Vec<u32>, u64)> = run(&mut solver)
            .into_iter()
            .map(|pattern| (pattern.sorted_items(), pattern.utility))
            .collect();
        found.sort();
        found
    }

    fn scenario_a() -> Problem {
        let dataset = crate::dataset! {
            {1 => 2, 2 => 3},
            {2 => 2, 3 => 2},
            {1 => 2, 2 => 3, 3 => 2},
        };
        Problem::new(&dataset, 6)
    }

    // every subset of 1..=6 with at least two items, listed twice
    fn doubled_subsets() -> Problem {
        let mut transactions = Vec::new();
        for mask in 1u32..64 {
            if mask.count_ones() < 2 {
                continue;
            }
            let pairs: Vec<(u32, u64)> = (1..=6)
                .filter(|i| mask & (1 << (i - 1)) != 0)
                .map(|i| (i, i as u64))
                .collect();
            transactions.push(crate::RawTransaction::from_pairs(pairs.clone()));
            transactions.push(crate::RawTransaction::from_pairs(pairs));
        }
        Problem::new(&crate::Dataset::from_transactions(transactions), 1)
    }

    #[test]
    fn root_candidates() {
        let problem = scenario_a();
        let options = Options::default();
        let mut solver = Solver::new(&problem, &options);
        let root = solver.root();
        assert_eq!(root.primary(), &[0, 1, 2]);
        assert_eq!(root.secondary, vec![0, 1, 2]);
    }

    #[test]
    fn closed_patterns() {
        let problem = scenario_a();
        let expected = vec![
            (vec![1, 2], 10),
            (vec![1, 2, 3], 7),
            (vec![2], 8),
            (vec![2, 3], 9),
        ];
        assert_eq!(mine(&problem, &Options::default()), expected);
        let plain = Options::default()
            .with_merging(false)
            .with_subtree_pruning(false)
            .with_closure_jumping(false);
        assert_eq!(mine(&problem, &plain), expected);
    }

    #[test]
    fn closure_jump_skips_subtree() {
        let problem = scenario_a();
        let options = Options::default();
        let mut solver = Solver::new(&problem, &options);
        let found = run(&mut solver);
        assert_eq!(solver.stats().patterns, 4);
        // {3, 1} and {1} absorb item 2; the other extensions have nothing left to absorb
        assert_eq!(solver.stats().closure_jumps, 2);
        assert_eq!(found[0], Pattern::new(vec![3, 1, 2], 7));
    }

    #[test]
    fn leaves_are_not_closure_jumps() {
        let dataset = crate::dataset! {
            {1 => 5},
            {2 => 5},
        };
        let problem = Problem::new(&dataset, 1);
        let options = Options::default();
        let mut solver = Solver::new(&problem, &options);
        assert_eq!(run(&mut solver).len(), 2);
        assert_eq!(solver.stats().closure_jumps, 0);
    }

    #[test]
    fn detached_branches_agree() {
        let problem = scenario_a();
        let options = Options::default();
        let mut solver = Solver::new(&problem, &options);
        let root = solver.root();
        let mut found: Vec<Pattern> = Vec::new();
        for ix in (0..root.primary().len()).rev() {
            solver.detached_branch(&root, ix, &mut found).unwrap();
        }
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn merged_rows_released_with_frame() {
        let dataset = crate::dataset! {
            {1 => 1, 2 => 1, 3 => 1},
            {1 => 1, 2 => 1, 3 => 1},
            {2 => 1, 3 => 1},
        };
        let problem = Problem::new(&dataset, 1);
        let options = Options::default().with_closure_jumping(false);
        let mut solver = Solver::new(&problem, &options);
        let mut root = solver.root();
        let item = root.primary[0];
        let mut found: Vec<Pattern> = Vec::new();

        let expansion = solver
            .expand(
                &root.db,
                &mut root.cursors,
                &root.secondary,
                item,
                &mut found,
            )
            .unwrap();
        let child = expansion.child.unwrap();
        assert_eq!(child.built, 1);

        let weak: Vec<_> = child.db.iter().filter_map(Projected::downgrade).collect();
        assert_eq!(weak.len(), 1);
        assert!(weak[0].upgrade().is_some());
        drop(child);
        assert!(weak[0].upgrade().is_none());
    }

    #[test]
    fn merged_storage_bounded_by_path() {
        let problem = doubled_subsets();
        let options = Options::default();
        let mut solver = Solver::new(&problem, &options);
        let found = run(&mut solver);
        assert_eq!(found.len(), 63);

        // each frame builds at most one merged row per pair of its parent's rows
        let depth = problem.items().len() as u64;
        let rows = problem.transactions().len() as u64;
        let stats = solver.stats();
        assert!(stats.peak_merged > 0);
        assert!(stats.peak_merged <= depth * rows / 2);
        assert!(stats.merges > stats.peak_merged);
        assert_eq!(solver.live_merged, 0);
    }
}

use crate::transaction::{Projected, Transaction};

/// The database of `prefix ∪ {item}` together with its utility and support.
pub(crate) struct Projection<'a> {
    pub(crate) db: Vec<Projected<'a>>,
    pub(crate) utility: u64,
    pub(crate) support: u64,
    // every record containing the extended prefix, including those with nothing left to project
    pub(crate) covered: Vec<u32>,
    // transactions folded into another one
    pub(crate) merged: u64,
    // transactions of `db` built by merging
    pub(crate) built: u64,
}

/// Projects `db` on `item`.
///
/// `cursors[k]` is the position in `db[k]`'s transaction from which `item` is searched. It is
/// advanced past the searched position, so candidates of one frame must be projected in
/// ascending order.
pub(crate) fn project<'a>(
    db: &[Projected<'a>],
    cursors: &mut [usize],
    item: u32,
    mut merger: Merger<'a>,
) -> Projection<'a> {
    debug_assert_eq!(db.len(), cursors.len());

    let mut utility = 0;
    let mut support = 0;
    let mut covered = Vec::new();

    for (entry, cursor) in db.iter().zip(cursors.iter_mut()) {
        let tx = entry.transaction();
        let items = tx.items();
        let from = *cursor;

        let pos = match items[from..].binary_search(&item) {
            Ok(offset) => from + offset,
            Err(offset) => {
                *cursor = from + offset;
                continue;
            }
        };
        *cursor = pos + 1;

        let prefix_utility = entry.prefix_utility() + tx.utilities()[pos];
        utility += prefix_utility;
        support += entry.weight();
        covered.extend_from_slice(entry.records());

        if pos + 1 < items.len() {
            merger.push(entry.advance(pos + 1, prefix_utility));
        }
    }

    let (db, merged, built) = merger.finish();
    Projection {
        db,
        utility,
        support,
        covered,
        merged,
        built,
    }
}

/// Collects projected transactions, merging runs of identical ones.
///
/// With merging disabled every transaction passes through unchanged. Merged transactions are
/// owned by the projections referring to them and go away with the last of those.
pub(crate) struct Merger<'a> {
    // longest suffix still considered for merging, `None` when merging is off
    cap: Option<usize>,
    out: Vec<Projected<'a>>,
    pending: Pending<'a>,
    merged: u64,
    built: u64,
}

enum Pending<'a> {
    Empty,
    Single(Projected<'a>),
    Merged(MergeBuffer<'a>),
}

struct MergeBuffer<'a> {
    // first of the merged transactions, its suffix gives the items
    first: Projected<'a>,
    utilities: Vec<u64>,
    prefix_utility: u64,
    records: Vec<u32>,
}

impl<'a> MergeBuffer<'a> {
    fn start(first: Projected<'a>, second: Projected<'a>) -> Self {
        let mut buffer = MergeBuffer {
            utilities: first.utilities().to_vec(),
            prefix_utility: first.prefix_utility(),
            records: first.records().to_vec(),
            first,
        };
        buffer.absorb(second);
        buffer
    }

    fn items(&self) -> &[u32] {
        self.first.items()
    }

    fn absorb(&mut self, other: Projected<'a>) {
        for (acc, &utility) in self.utilities.iter_mut().zip(other.utilities()) {
            *acc += utility;
        }
        self.prefix_utility += other.prefix_utility();
        self.records.extend_from_slice(other.records());
    }

    fn build(self) -> Projected<'a> {
        let tx = Transaction::new(self.first.items().to_vec(), self.utilities, self.records);
        Projected::merged(tx, self.prefix_utility)
    }
}

impl<'a> Merger<'a> {
    pub(crate) fn new(cap: Option<usize>) -> Self {
        Merger {
            cap,
            out: Vec::new(),
            pending: Pending::Empty,
            merged: 0,
            built: 0,
        }
    }

    pub(crate) fn push(&mut self, projected: Projected<'a>) {
        if !self.cap.is_some_and(|cap| projected.len() <= cap) {
            self.flush();
            self.out.push(projected);
            return;
        }

        self.pending = match std::mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Single(prev) if same_suffix(prev.items(), projected.items()) => {
                self.merged += 1;
                Pending::Merged(MergeBuffer::start(prev, projected))
            }
            Pending::Merged(mut buffer) if same_suffix(buffer.items(), projected.items()) => {
                self.merged += 1;
                buffer.absorb(projected);
                Pending::Merged(buffer)
            }
            other => {
                self.pending = other;
                self.flush();
                Pending::Single(projected)
            }
        };
    }

    fn flush(&mut self) {
        match std::mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Empty => {}
            Pending::Single(projected) => self.out.push(projected),
            Pending::Merged(buffer) => {
                log::trace!(
                    "merged {} records over a suffix of {} items",
                    buffer.records.len(),
                    buffer.items().len()
                );
                self.built += 1;
                self.out.push(buffer.build());
            }
        }
    }

    /// Returns the projected database, how many transactions were merged away and how many
    /// merged transactions were built.
    pub(crate) fn finish(mut self) -> (Vec<Projected<'a>>, u64, u64) {
        self.flush();
        (self.out, self.merged, self.built)
    }
}

// Suffixes sharing their last items are the likely candidates, so compare from the end.
fn same_suffix(a: &[u32], b: &[u32]) -> bool {
    a.len() == b.len() && a.iter().rev().eq(b.iter().rev())
}

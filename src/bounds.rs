use bit_set::BitSet;
use paste::paste;

use crate::transaction::Projected;

/// Per-item upper bounds of the node being expanded, indexed by renamed item id.
pub(crate) struct BoundTable {
    // local utility: prefix utility plus everything left in the transaction
    local: Vec<u64>,
    // subtree utility: prefix utility plus the tracked items from this one onwards
    subtree: Vec<u64>,
    // number of records containing the item
    support: Vec<u64>,
    tracked: BitSet,
}

macro_rules! define_bound_accessors {
    ($table:ident) => {
        paste! {
            impl BoundTable {
                pub(crate) fn $table(&self, item: u32) -> u64 {
                    debug_assert!(self.tracked.contains(item as usize));
                    self.$table[item as usize]
                }

                fn [<add_ $table>](&mut self, item: u32, amount: u64) {
                    self.$table[item as usize] += amount;
                }
            }
        }
    };
}

define_bound_accessors! { local }
define_bound_accessors! { subtree }
define_bound_accessors! { support }

impl BoundTable {
    pub(crate) fn new(n_items: usize) -> Self {
        BoundTable {
            local: vec![0; n_items],
            subtree: vec![0; n_items],
            support: vec![0; n_items],
            tracked: BitSet::with_capacity(n_items),
        }
    }

    /// Recomputes the bounds of `items` over `db`; other entries become meaningless.
    pub(crate) fn refresh(&mut self, db: &[Projected<'_>], items: &[u32]) {
        self.tracked.clear();
        for &item in items {
            let ix = item as usize;
            self.tracked.insert(ix);
            self.local[ix] = 0;
            self.subtree[ix] = 0;
            self.support[ix] = 0;
        }

        for entry in db {
            let prefix_utility = entry.prefix_utility();
            let local = entry.remaining_utility() + prefix_utility;
            let weight = entry.weight();

            let mut suffix = 0;
            for (&item, &utility) in entry.items().iter().zip(entry.utilities()).rev() {
                if !self.tracked.contains(item as usize) {
                    continue;
                }
                suffix += utility;
                self.add_subtree(item, suffix + prefix_utility);
                self.add_local(item, local);
                self.add_support(item, weight);
            }
        }
    }
}

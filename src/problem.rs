use rustc_hash::FxHashMap;

use crate::dataset::Dataset;
use crate::transaction::Transaction;

/// Bidirectional mapping between original item ids and dense renamed ids.
#[derive(Debug, Clone, Default)]
pub(crate) struct ItemMap {
    new_to_old: Vec<u32>,
    old_to_new: FxHashMap<u32, u32>,
}

impl ItemMap {
    fn new(ordered: impl IntoIterator<Item = u32>) -> Self {
        let new_to_old: Vec<u32> = ordered.into_iter().collect();
        let old_to_new = new_to_old
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u32))
            .collect();
        ItemMap {
            new_to_old,
            old_to_new,
        }
    }

    pub(crate) fn rename(&self, original: u32) -> Option<u32> {
        self.old_to_new.get(&original).copied()
    }

    pub(crate) fn original(&self, renamed: u32) -> u32 {
        self.new_to_old[renamed as usize]
    }

    pub(crate) fn len(&self) -> usize {
        self.new_to_old.len()
    }
}

/// The pruned and renamed database the search runs on.
pub(crate) struct Problem {
    // indexed by record id
    transactions: Vec<Transaction>,
    items: ItemMap,
    min_utility: u64,
}

impl Problem {
    pub(crate) fn new(dataset: &Dataset, min_utility: u64) -> Self {
        let mut twu: FxHashMap<u32, u64> = FxHashMap::default();
        for tx in dataset.transactions() {
            for &item in tx.items() {
                *twu.entry(item).or_default() += tx.total();
            }
        }

        let mut promising: Vec<(u32, u64)> = twu
            .into_iter()
            .filter(|&(_, bound)| bound >= min_utility)
            .collect();
        promising.sort_unstable_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        let items = ItemMap::new(promising.iter().map(|&(item, _)| item));

        let mut rows: Vec<Vec<(u32, u64)>> = dataset
            .transactions()
            .iter()
            .filter_map(|tx| {
                let mut row: Vec<(u32, u64)> = tx
                    .pairs()
                    .filter_map(|(item, utility)| Some((items.rename(item)?, utility)))
                    .collect();
                row.sort_unstable_by_key(|&(item, _)| item);
                (!row.is_empty()).then_some(row)
            })
            .collect();

        // identical projections end up next to each other
        rows.sort_unstable_by(|a, b| {
            let a = a.iter().rev().map(|&(item, _)| item);
            let b = b.iter().rev().map(|&(item, _)| item);
            a.cmp(b)
        });

        let transactions: Vec<Transaction> = rows
            .into_iter()
            .enumerate()
            .map(|(record, row)| {
                let (items, utilities) = row.into_iter().unzip();
                Transaction::new(items, utilities, vec![record as u32])
            })
            .collect();

        log::debug!(
            "{} of {} items promising, {} of {} transactions kept",
            items.len(),
            distinct_items(dataset),
            transactions.len(),
            dataset.len()
        );

        Problem {
            transactions,
            items,
            min_utility,
        }
    }

    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn items(&self) -> &ItemMap {
        &self.items
    }

    pub(crate) fn min_utility(&self) -> u64 {
        self.min_utility
    }

    /// Whether some item smaller than `item` and absent from `prefix` occurs in every
    /// record of `covered`, i.e. `prefix ∪ {item}` is not the leftmost way to its closure.
    pub(crate) fn has_backward_extension(
        &self,
        prefix: &[u32],
        item: u32,
        covered: &[u32],
    ) -> bool {
        let Some((&first, rest)) = covered.split_first() else {
            return false;
        };

        let mut candidates: Vec<u32> = self.transactions[first as usize]
            .items()
            .iter()
            .copied()
            .take_while(|&i| i < item)
            .filter(|i| prefix.binary_search(i).is_err())
            .collect();

        for &record in rest {
            if candidates.is_empty() {
                break;
            }
            let items = self.transactions[record as usize].items();
            candidates.retain(|i| items.binary_search(i).is_ok());
        }

        !candidates.is_empty()
    }
}

fn distinct_items(dataset: &Dataset) -> usize {
    let mut seen: Vec<u32> = dataset
        .transactions()
        .iter()
        .flat_map(|tx| tx.items().iter().copied())
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

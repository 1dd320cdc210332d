use std::ops::Deref;
use std::sync::Arc;

/// An immutable transaction in renamed item ids.
///
/// `records` lists the original transactions it stands for: one for a
/// transaction of the pruned database, several for a merged one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transaction {
    items: Box<[u32]>,
    utilities: Box<[u64]>,
    records: Box<[u32]>,
}

impl Transaction {
    pub(crate) fn new(items: Vec<u32>, utilities: Vec<u64>, records: Vec<u32>) -> Self {
        debug_assert_eq!(items.len(), utilities.len());
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(!records.is_empty());
        Transaction {
            items: items.into_boxed_slice(),
            utilities: utilities.into_boxed_slice(),
            records: records.into_boxed_slice(),
        }
    }

    pub(crate) fn items(&self) -> &[u32] {
        &self.items
    }

    pub(crate) fn utilities(&self) -> &[u64] {
        &self.utilities
    }

    pub(crate) fn records(&self) -> &[u32] {
        &self.records
    }
}

// Rows of the pruned database are borrowed; merged rows live as long as a projection uses them.
#[derive(Debug, Clone)]
enum Handle<'a> {
    Borrowed(&'a Transaction),
    Merged(Arc<Transaction>),
}

impl Deref for Handle<'_> {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        match self {
            Handle::Borrowed(tx) => *tx,
            Handle::Merged(tx) => tx.as_ref(),
        }
    }
}

/// The suffix of a transaction that is still relevant below the current prefix.
#[derive(Debug, Clone)]
pub(crate) struct Projected<'a> {
    tx: Handle<'a>,
    start: usize,
    // utility of the prefix summed over the records of `tx`
    prefix_utility: u64,
}

impl<'a> Projected<'a> {
    pub(crate) fn whole(tx: &'a Transaction) -> Self {
        Projected {
            tx: Handle::Borrowed(tx),
            start: 0,
            prefix_utility: 0,
        }
    }

    /// Wraps a transaction built by merging; it is dropped with the last projection using it.
    pub(crate) fn merged(tx: Transaction, prefix_utility: u64) -> Self {
        debug_assert!(!tx.items.is_empty());
        Projected {
            tx: Handle::Merged(Arc::new(tx)),
            start: 0,
            prefix_utility,
        }
    }

    /// The same transaction from `start` on.
    pub(crate) fn advance(&self, start: usize, prefix_utility: u64) -> Self {
        debug_assert!(start < self.tx.items.len());
        Projected {
            tx: self.tx.clone(),
            start,
            prefix_utility,
        }
    }

    pub(crate) fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub(crate) fn start(&self) -> usize {
        self.start
    }

    pub(crate) fn prefix_utility(&self) -> u64 {
        self.prefix_utility
    }

    pub(crate) fn items(&self) -> &[u32] {
        &self.tx.items[self.start..]
    }

    pub(crate) fn utilities(&self) -> &[u64] {
        &self.tx.utilities[self.start..]
    }

    pub(crate) fn records(&self) -> &[u32] {
        &self.tx.records
    }

    pub(crate) fn remaining_utility(&self) -> u64 {
        self.utilities().iter().sum()
    }

    /// Number of original transactions behind this one.
    pub(crate) fn weight(&self) -> u64 {
        self.tx.records.len() as u64
    }

    pub(crate) fn len(&self) -> usize {
        self.tx.items.len() - self.start
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> Option<std::sync::Weak<Transaction>> {
        match &self.tx {
            Handle::Borrowed(_) => None,
            Handle::Merged(tx) => Some(Arc::downgrade(tx)),
        }
    }
}

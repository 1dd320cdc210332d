use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Longest projected suffix considered for merging unless configured otherwise.
pub const DEFAULT_MERGE_SIZE_CAP: usize = 1000;

/// Switches and limits of one search.
#[derive(Debug, Clone)]
pub struct Options {
    /// Merge projected transactions with identical suffixes.
    pub merge_transactions: bool,
    /// Only recurse into items whose subtree utility meets the threshold.
    pub subtree_pruning: bool,
    /// Emit a closure directly when every remaining item is shared by all records.
    pub closure_jumping: bool,
    /// Longest projected suffix considered for merging.
    pub merge_size_cap: usize,
    /// Read at most this many transactions.
    pub max_transactions: Option<usize>,
    /// Explore top-level branches on the rayon thread pool.
    pub parallel: bool,
    /// Checked before every top-level branch; a raised flag aborts the search.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            merge_transactions: true,
            subtree_pruning: true,
            closure_jumping: true,
            merge_size_cap: DEFAULT_MERGE_SIZE_CAP,
            max_transactions: None,
            parallel: false,
            cancel: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merging(mut self, enabled: bool) -> Self {
        self.merge_transactions = enabled;
        self
    }

    pub fn with_subtree_pruning(mut self, enabled: bool) -> Self {
        self.subtree_pruning = enabled;
        self
    }

    pub fn with_closure_jumping(mut self, enabled: bool) -> Self {
        self.closure_jumping = enabled;
        self
    }

    pub fn with_merge_size_cap(mut self, cap: usize) -> Self {
        self.merge_size_cap = cap;
        self
    }

    pub fn with_max_transactions(mut self, max: usize) -> Self {
        self.max_transactions = Some(max);
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_transactions == Some(0) {
            return Err(Error::InvalidParameter(
                "max_transactions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn merge_cap(&self) -> Option<usize> {
        self.merge_transactions.then_some(self.merge_size_cap)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::error::{parse_int, FormatError, Result};

/// A transaction as read from the input, in original item ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    items: Vec<u32>,
    utilities: Vec<u64>,
    total: u64,
}

impl RawTransaction {
    /// Builds a transaction whose declared total is the sum of its item utilities.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u64)>) -> Self {
        let (items, utilities): (Vec<u32>, Vec<u64>) = pairs.into_iter().unzip();
        let total = utilities.iter().sum();
        RawTransaction {
            items,
            utilities,
            total,
        }
    }

    pub fn items(&self) -> &[u32] {
        &self.items
    }

    pub fn utilities(&self) -> &[u64] {
        &self.utilities
    }

    /// The declared transaction utility.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn pairs(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.items
            .iter()
            .copied()
            .zip(self.utilities.iter().copied())
    }
}

impl FromStr for RawTransaction {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, FormatError> {
        let segments: Vec<&str> = line.split(':').collect();
        let [items, total, utilities] = segments.as_slice() else {
            return Err(FormatError::Segments {
                found: segments.len(),
            });
        };

        let items = items
            .split_whitespace()
            .map(parse_int::<u32>)
            .collect::<Result<Vec<_>, _>>()?;
        let total = parse_int::<u64>(total.trim())?;
        let utilities = utilities
            .split_whitespace()
            .map(parse_int::<u64>)
            .collect::<Result<Vec<_>, _>>()?;

        if items.len() != utilities.len() {
            return Err(FormatError::LengthMismatch {
                items: items.len(),
                utilities: utilities.len(),
            });
        }

        let mut seen = FxHashSet::default();
        for &item in &items {
            if item == 0 {
                return Err(FormatError::ZeroItem);
            }
            if !seen.insert(item) {
                return Err(FormatError::DuplicateItem { item });
            }
        }

        let sum: u64 = utilities.iter().sum();
        if total < sum {
            return Err(FormatError::InconsistentTotal {
                declared: total,
                sum,
            });
        }

        Ok(RawTransaction {
            items,
            utilities,
            total,
        })
    }
}

/// The transaction database of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    transactions: Vec<RawTransaction>,
    max_item: u32,
}

impl Dataset {
    pub fn from_transactions(transactions: Vec<RawTransaction>) -> Self {
        let max_item = transactions
            .iter()
            .flat_map(|tx| tx.items.iter().copied())
            .max()
            .unwrap_or(0);
        Dataset {
            transactions,
            max_item,
        }
    }

    /// Reads a transaction file, stopping after `max_transactions` transactions if given.
    pub fn load(path: impl AsRef<Path>, max_transactions: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file), max_transactions)?;
        log::info!(
            "loaded {} transactions from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: BufRead>(reader: R, max_transactions: Option<usize>) -> Result<Self> {
        let limit = max_transactions.unwrap_or(usize::MAX);
        let mut transactions = Vec::new();

        for (ix, line) in reader.lines().enumerate() {
            if transactions.len() >= limit {
                break;
            }
            let line = line?;
            let line = line.trim();
            if is_skipped(line) {
                continue;
            }
            let tx = line.parse::<RawTransaction>().map_err(|e| e.at(ix + 1))?;
            transactions.push(tx);
        }

        Ok(Self::from_transactions(transactions))
    }

    pub fn transactions(&self) -> &[RawTransaction] {
        &self.transactions
    }

    pub fn max_item(&self) -> u32 {
        self.max_item
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with(&['#', '%', '@'][..])
}

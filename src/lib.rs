//! Closed high-utility itemset mining.
//!
//! A transaction database lists, for every transaction, the items it contains and the
//! utility each contributes. The utility of an itemset is summed over the transactions
//! containing all of it, and an itemset is closed when no superset occurs in exactly the
//! same transactions. [`mine`] finds every closed itemset whose utility reaches a threshold.
//!
//! ```
//! use closed_huim::{mine, Options};
//!
//! let dataset = closed_huim::dataset! {
//!     {1 => 2, 2 => 3},
//!     {2 => 2, 3 => 2},
//!     {1 => 2, 2 => 3, 3 => 2},
//! };
//! let patterns = mine(&dataset, 10, &Options::default()).unwrap();
//! assert_eq!(patterns.len(), 1);
//! assert_eq!(patterns[0].sorted_items(), vec![1, 2]);
//! assert_eq!(patterns[0].utility, 10);
//! ```

#[macro_use]
mod macros;

mod bounds;
mod dataset;
mod error;
mod miner;
mod options;
mod output;
mod problem;
mod projection;
mod solver;
mod transaction;

pub use dataset::{Dataset, RawTransaction};
pub use error::{Error, FormatError, Result};
pub use miner::{mine, run_search, Miner, Stats};
pub use options::{Options, DEFAULT_MERGE_SIZE_CAP};
pub use output::{Emitter, Pattern};

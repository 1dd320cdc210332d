use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{parse_int, FormatError, Result};

const UTILITY_TAG: &str = "#UTIL:";

/// A closed high-utility itemset in original item ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Items in discovery order.
    pub items: Vec<u32>,
    pub utility: u64,
}

impl Pattern {
    pub fn new(items: Vec<u32>, utility: u64) -> Self {
        Pattern { items, utility }
    }

    /// The items in ascending original id order.
    pub fn sorted_items(&self) -> Vec<u32> {
        let mut items = self.items.clone();
        items.sort_unstable();
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            write!(f, "{} ", item)?;
        }
        write!(f, "{} {}", UTILITY_TAG, self.utility)
    }
}

impl FromStr for Pattern {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, FormatError> {
        let (items, utility) = line
            .split_once(UTILITY_TAG)
            .ok_or(FormatError::MissingUtility)?;
        let items = items
            .split_whitespace()
            .map(parse_int::<u32>)
            .collect::<Result<Vec<_>, _>>()?;
        if items.is_empty() {
            return Err(FormatError::EmptyPattern);
        }
        let utility = parse_int::<u64>(utility.trim())?;
        Ok(Pattern { items, utility })
    }
}

enum Target {
    Stream(BufWriter<Box<dyn Write + Send>>),
    Memory(Vec<Pattern>),
}

/// Destination of the patterns found by a search.
pub struct Emitter {
    target: Target,
    count: u64,
}

impl Emitter {
    pub fn in_memory() -> Self {
        Emitter {
            target: Target::Memory(Vec::new()),
            count: 0,
        }
    }

    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Emitter {
            target: Target::Stream(BufWriter::new(Box::new(writer))),
            count: 0,
        }
    }

    pub fn to_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::to_writer(File::create(path)?))
    }

    pub fn emit(&mut self, pattern: Pattern) -> Result<()> {
        match &mut self.target {
            Target::Stream(out) => writeln!(out, "{}", pattern)?,
            Target::Memory(patterns) => patterns.push(pattern),
        }
        self.count += 1;
        Ok(())
    }

    /// Number of patterns emitted so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Flushes a stream target, or hands back the collected patterns.
    pub fn finish(self) -> Result<Option<Vec<Pattern>>> {
        match self.target {
            Target::Stream(mut out) => {
                out.flush()?;
                Ok(None)
            }
            Target::Memory(patterns) => Ok(Some(patterns)),
        }
    }
}

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed transaction at line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("search cancelled")]
    Cancelled,
}

/// Reasons a transaction line or a pattern line fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("expected `items:total:utilities`, found {found} segment(s)")]
    Segments { found: usize },

    #[error("{items} item(s) but {utilities} utility value(s)")]
    LengthMismatch { items: usize, utilities: usize },

    #[error("`{token}` is not a non-negative integer")]
    InvalidInteger { token: String },

    #[error("item ids must be positive")]
    ZeroItem,

    #[error("item {item} occurs more than once")]
    DuplicateItem { item: u32 },

    #[error("declared total {declared} is smaller than the sum of item utilities {sum}")]
    InconsistentTotal { declared: u64, sum: u64 },

    #[error("missing `#UTIL:` tag")]
    MissingUtility,

    #[error("a pattern needs at least one item")]
    EmptyPattern,
}

impl FormatError {
    pub(crate) fn at(self, line: usize) -> Error {
        Error::Format { line, source: self }
    }
}

pub(crate) fn parse_int<T: std::str::FromStr>(token: &str) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidInteger {
        token: token.to_string(),
    })
}

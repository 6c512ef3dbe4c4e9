/// Custom Result type for pileup operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a single pileup record from being parsed or decoded.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The line had fewer than the mandatory six columns
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid position {0:?}")]
    InvalidPosition(String),

    /// Coverage must be a non-negative integer or the unset sentinel `-1`
    #[error("invalid coverage {0:?}")]
    InvalidCoverage(String),

    #[error("empty reference base column")]
    EmptyReferenceBase,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Niffler(#[from] niffler::Error),

    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

/// Failure to read an indel run length from the base-call column.
///
/// Both variants carry the offset just past whatever was consumed, so a caller can resume there.
#[derive(thiserror::Error, Debug, Eq, PartialEq, Clone)]
pub enum RunLengthError {
    #[error("no digits in run length")]
    NoDigits { end: usize },

    #[error("run length of {digits} digits exceeds {max} digits")]
    TooManyDigits { digits: usize, max: usize, end: usize },
}

impl RunLengthError {
    pub fn end(&self) -> usize {
        match self {
            RunLengthError::NoDigits { end } | RunLengthError::TooManyDigits { end, .. } => *end,
        }
    }
}

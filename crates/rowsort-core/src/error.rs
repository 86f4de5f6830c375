use thiserror::Error;

/// Canonical result for `rowsort-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can originate from the typed-value contract (`Datum`) or the
/// row codec built on top of it. Higher layers (`rowsort-io`, `rowsort`) map
/// these into their own error enums.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("comparator error: {0}")]
    Compare(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("malformed run: {0}")]
    MalformedRun(String),
}

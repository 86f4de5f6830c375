use thiserror::Error;

/// Canonical result for the sort engine.
pub type Result<T> = std::result::Result<T, SortError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("operation not valid in the current phase")]
    WrongPhase,

    #[error("sorter already closed")]
    AlreadyClosed,

    #[error("comparator error: {0}")]
    Compare(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("malformed run file: {0}")]
    MalformedRun(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("run file contained no rows")]
    EmptyRun,
}

impl From<rowsort_core::error::Error> for SortError {
    fn from(e: rowsort_core::error::Error) -> Self {
        use rowsort_core::error::Error as E;
        match e {
            E::Compare(s) => SortError::Compare(s),
            E::Codec(s) => SortError::Codec(s),
            E::MalformedRun(s) => SortError::MalformedRun(s),
        }
    }
}

impl From<rowsort_io::error::Error> for SortError {
    fn from(e: rowsort_io::error::Error) -> Self {
        use rowsort_io::error::Error as E;
        match e {
            E::Io(s) => SortError::Io(s),
            E::MalformedRun(s) => SortError::MalformedRun(s),
        }
    }
}

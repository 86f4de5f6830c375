use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed run: {0}")]
    MalformedRun(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<rowsort_core::error::Error> for Error {
    fn from(e: rowsort_core::error::Error) -> Self {
        match e {
            rowsort_core::error::Error::MalformedRun(m) => Error::MalformedRun(m),
            other => Error::MalformedRun(other.to_string()),
        }
    }
}

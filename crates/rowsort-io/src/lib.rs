#![forbid(unsafe_code)]
//! rowsort-io: run-file storage and framing.
//!
//! This crate supplies a concrete `Storage` implementation and the streaming
//! reader/writer built on top of it, while `rowsort-core` owns the
//! byte-level row codec these build on.

pub mod error;
pub mod run_cursor;
pub mod run_writer;
pub mod storage;

pub use error::{Error, Result};
pub use run_cursor::RunCursor;
pub use run_writer::write_run;
pub use storage::{FsStorage, Storage};

//! Abstract storage interface for run files.
//!
//! Deliberately narrow: no `read_range`/`etag`/`list` for checksummed,
//! randomly-addressable cloud segments, just the streaming create/open/
//! remove operations this engine actually needs — run files are written
//! once, read forward-only, and the whole directory is removed on `Close`.

pub mod fs;

use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;

pub use fs::FsStorage;

/// Filesystem-like backend for run files, implemented by [`FsStorage`] for
/// the local disk.
pub trait Storage: Send + Sync {
    /// Create (or truncate) a file for writing and return a handle to it.
    fn create(&self, path: &Path) -> Result<Box<dyn Write + Send>>;

    /// Open an existing file for sequential reading.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Recursively remove a directory and everything under it. Idempotent:
    /// a missing directory is not an error.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// True if `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

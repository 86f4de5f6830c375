//! Local filesystem storage: a thin, unbuffered wrapper around `std::fs`,
//! one `Error::Io` variant per failing syscall.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Local-disk storage backend — no cloud object-store adapters here.
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FsStorage {
    fn create(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Io(format!("mkparent: {e}")))?;
        }
        let f = File::create(path).map_err(|e| Error::Io(format!("create: {e}")))?;
        Ok(Box::new(f))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let f = File::open(path).map_err(|e| Error::Io(format!("open: {e}")))?;
        Ok(Box::new(f))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_dir_all(path).map_err(|e| Error::Io(format!("remove_dir_all: {e}")))?;
        }
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

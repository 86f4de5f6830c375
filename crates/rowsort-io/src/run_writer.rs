//! Writing a sorted run file.
//!
//! A worker encodes every row of a flushed batch into one contiguous byte
//! buffer (see `rowsort::worker`) and hands it here to be written with a
//! single physical write, rather than once per row block.

use std::io::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::storage::Storage;

/// Write `blocks` (the concatenation of one or more encoded row blocks) to
/// `path` in a single write call.
pub fn write_run(storage: &dyn Storage, path: &Path, blocks: &[u8]) -> Result<()> {
    let mut file = storage.create(path)?;
    file.write_all(blocks).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;
    use std::io::Read;

    #[test]
    fn writes_whole_buffer_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run-0.bin");
        let storage = FsStorage::new();

        write_run(&storage, &path, b"abcxyz").unwrap();

        let mut f = storage.open_read(&path).unwrap();
        let mut got = Vec::new();
        f.read_to_end(&mut got).unwrap();
        assert_eq!(got, b"abcxyz");
    }
}

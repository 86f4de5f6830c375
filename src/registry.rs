//! Tracks which run files a sort has produced. Name
//! generation and the committed-file list share one mutex so a worker can
//! never be handed a name whose slot another worker has already claimed.

use std::path::{Path, PathBuf};

use rowsort_core::id::RunId;

pub struct FileRegistry {
    next_id: u64,
    files: Vec<PathBuf>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            files: Vec::new(),
        }
    }

    /// Reserve the next run file name under `tmp_dir`. Reserving a name does
    /// not commit it — a worker that fails after this call simply never
    /// calls [`register`](Self::register), and the name is never reused.
    pub fn alloc_path(&mut self, tmp_dir: &Path) -> PathBuf {
        let id = RunId::new(self.next_id);
        self.next_id += 1;
        tmp_dir.join(format!("run-{}.bin", id.get()))
    }

    /// Commit a successfully written run file, making it visible to the
    /// Phase 2 merge.
    pub fn register(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_monotonic_and_unregistered_paths_are_not_listed() {
        let mut reg = FileRegistry::new();
        let dir = Path::new("/tmp/x");
        let p0 = reg.alloc_path(dir);
        let p1 = reg.alloc_path(dir);
        assert_ne!(p0, p1);
        assert!(reg.files().is_empty());

        reg.register(p0.clone());
        assert_eq!(reg.files(), &[p0]);
    }
}

//! Round-robin routing of incoming rows to the first free worker, with
//! bounded-sleep backpressure when every worker is busy flushing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rowsort_core::row::Row;
use rowsort_core::value::Datum;

use crate::error::Result;
use crate::worker::Worker;

const BACKPRESSURE_SLEEP: Duration = Duration::from_millis(100);

pub struct Dispatcher<D: Datum> {
    workers: Vec<Arc<Worker<D>>>,
    next: AtomicUsize,
}

impl<D: Datum + Send + Sync + 'static> Dispatcher<D>
where
    D::Ctx: Send + Sync,
{
    pub fn new(workers: Vec<Arc<Worker<D>>>) -> Self {
        assert!(!workers.is_empty(), "a dispatcher needs at least one worker");
        Self {
            workers,
            next: AtomicUsize::new(0),
        }
    }

    /// Scan workers starting from the last successful index, handing the
    /// row to the first one that isn't currently flushing. If every worker
    /// is busy, sleep and scan again rather than spin.
    pub fn input(&self, row: Row<D>) -> Result<()> {
        let n = self.workers.len();
        loop {
            let start = self.next.load(Ordering::Relaxed) % n;
            for offset in 0..n {
                let idx = (start + offset) % n;
                if !self.workers[idx].is_busy() {
                    let worker = Arc::clone(&self.workers[idx]);
                    let result = worker.input(row);
                    self.next.store((idx + 1) % n, Ordering::Relaxed);
                    return result;
                }
            }
            // every worker busy: back off instead of spinning, then rescan.
            // `row` is never moved in the loop above unless we return, so
            // it is still ours to retry with.
            thread::sleep(BACKPRESSURE_SLEEP);
        }
    }

    pub fn workers(&self) -> &[Arc<Worker<D>>] {
        &self.workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Comparator;
    use crate::registry::FileRegistry;
    use crate::wait_group::WaitGroup;
    use rowsort_core::value::Value;
    use rowsort_io::FsStorage;
    use std::sync::Mutex;

    fn dispatcher(capacity: usize, n: usize, tmp_dir: std::path::PathBuf) -> Dispatcher<Value> {
        let comparator = Arc::new(Comparator::new((), vec![false]));
        let registry = Arc::new(Mutex::new(FileRegistry::new()));
        let wait_group = Arc::new(WaitGroup::new());
        let storage: Arc<dyn rowsort_io::Storage> = Arc::new(FsStorage::new());
        let workers = (0..n)
            .map(|_| {
                Arc::new(Worker::new(
                    capacity,
                    Arc::clone(&comparator),
                    Arc::clone(&registry),
                    Arc::clone(&wait_group),
                    Arc::clone(&storage),
                    tmp_dir.clone(),
                ))
            })
            .collect();
        Dispatcher::new(workers)
    }

    #[test]
    fn routes_to_a_free_worker_without_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher(100, 2, dir.path().to_path_buf());
        for i in 0..10 {
            let row = Row::new(vec![Value::I64(i)], vec![], i);
            d.input(row).unwrap();
        }
    }
}

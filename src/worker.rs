//! Phase 1 worker: buffers incoming rows and flushes full batches to sorted
//! run files on a background thread.
//!
//! Kept pure and synchronous — no async runtime, just `std::thread` — but
//! each worker's flush runs off the calling thread so `Dispatcher::input`
//! never blocks on disk I/O for a batch that isn't full yet.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rowsort_core::codec::{encode_block, HEADER_LEN};
use rowsort_core::row::Row;
use rowsort_core::value::Datum;
use rowsort_io::{write_run, Storage};

use crate::comparator::Comparator;
use crate::error::{Result, SortError};
use crate::registry::FileRegistry;
use crate::wait_group::WaitGroup;

struct WorkerState<D: Datum> {
    batch: Vec<Row<D>>,
    /// First error a background flush hit. Sticky: once set, every
    /// subsequent `input` call on this worker fails immediately.
    error: Option<SortError>,
}

pub struct Worker<D: Datum> {
    capacity: usize,
    comparator: Arc<Comparator<D>>,
    registry: Arc<Mutex<FileRegistry>>,
    wait_group: Arc<WaitGroup>,
    storage: Arc<dyn Storage>,
    tmp_dir: PathBuf,
    busy: AtomicBool,
    row_size_max: AtomicUsize,
    state: Mutex<WorkerState<D>>,
}

impl<D: Datum + Send + Sync + 'static> Worker<D>
where
    D::Ctx: Send + Sync,
{
    pub fn new(
        capacity: usize,
        comparator: Arc<Comparator<D>>,
        registry: Arc<Mutex<FileRegistry>>,
        wait_group: Arc<WaitGroup>,
        storage: Arc<dyn Storage>,
        tmp_dir: PathBuf,
    ) -> Self {
        Self {
            capacity,
            comparator,
            registry,
            wait_group,
            storage,
            tmp_dir,
            busy: AtomicBool::new(false),
            row_size_max: AtomicUsize::new(0),
            state: Mutex::new(WorkerState {
                batch: Vec::new(),
                error: None,
            }),
        }
    }

    /// Observed without locking by the dispatcher's round-robin scan — a
    /// momentarily stale read just means a row goes to the next candidate
    /// instead.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn row_size_max(&self) -> usize {
        self.row_size_max.load(Ordering::Relaxed)
    }

    pub fn take_error(&self) -> Option<SortError> {
        self.state.lock().unwrap().error.clone()
    }

    /// Append a row to this worker's batch, spilling a sorted run once the
    /// batch reaches `capacity`.
    pub fn input(self: &Arc<Self>, row: Row<D>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = &state.error {
            return Err(e.clone());
        }
        state.batch.push(row);
        if state.batch.len() >= self.capacity {
            let batch = std::mem::take(&mut state.batch);
            drop(state);
            self.schedule_flush(batch);
        }
        Ok(())
    }

    /// Flush whatever is buffered right now, even under capacity. Called at
    /// the Phase 1 -> Phase 2 transition.
    pub fn drain(self: &Arc<Self>) {
        let mut state = self.state.lock().unwrap();
        if state.batch.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut state.batch);
        drop(state);
        self.schedule_flush(batch);
    }

    fn schedule_flush(self: &Arc<Self>, batch: Vec<Row<D>>) {
        self.busy.store(true, Ordering::Release);
        self.wait_group.add(1);

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = batch.len(), "spill scheduled");

        let this = Arc::clone(self);
        thread::spawn(move || {
            if let Err(e) = this.flush(batch) {
                let mut state = this.state.lock().unwrap();
                if state.error.is_none() {
                    state.error = Some(e);
                }
            }
            this.busy.store(false, Ordering::Release);
            this.wait_group.done();
        });
    }

    fn flush(&self, mut batch: Vec<Row<D>>) -> Result<()> {
        let mut sort_err: Option<SortError> = None;
        batch.sort_by(|a, b| match self.comparator.cmp(&a.key, &b.key) {
            Ok(ord) => ord,
            Err(e) => {
                if sort_err.is_none() {
                    sort_err = Some(e);
                }
                std::cmp::Ordering::Equal
            }
        });
        if let Some(e) = sort_err {
            return Err(e);
        }

        let mut buf = Vec::new();
        let mut max_len = 0usize;
        for row in &batch {
            let block = encode_block(row);
            max_len = max_len.max(block.len() - HEADER_LEN);
            buf.extend_from_slice(&block);
        }
        self.row_size_max.fetch_max(max_len, Ordering::Relaxed);

        let path = self.registry.lock().unwrap().alloc_path(&self.tmp_dir);
        write_run(&*self.storage, &path, &buf)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = batch.len(),
            bytes = buf.len(),
            path = %path.display(),
            "flushed run"
        );

        self.registry.lock().unwrap().register(path);
        Ok(())
    }
}

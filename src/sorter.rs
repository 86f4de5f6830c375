//! The public facade: a builder that configures a sort, and the `Sorter`
//! handle itself, which moves through `Input -> Output -> Closed` exactly
//! once.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rowsort_core::row::{Direction, Row};
use rowsort_core::value::Datum;
use rowsort_io::{FsStorage, RunCursor, Storage};

use crate::comparator::Comparator;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, SortError};
use crate::merge::MergeHeap;
use crate::registry::FileRegistry;
use crate::wait_group::WaitGroup;
use crate::worker::Worker;

/// Default worker pool size when the builder's `workers()` is left unset.
const DEFAULT_WORKERS: usize = 4;

enum PhaseState<D: Datum> {
    Input,
    Output(MergeHeap<D>),
    Closed,
}

/// Configures a [`Sorter`]. Every option below is required before
/// [`build`](Self::build) except `workers`, which defaults to 4.
pub struct SorterBuilder<D: Datum> {
    ctx: Option<D::Ctx>,
    key_arity: Option<usize>,
    val_arity: Option<usize>,
    buffer_capacity: Option<usize>,
    descending: Option<Direction>,
    tmp_dir: Option<PathBuf>,
    workers: usize,
    storage: Arc<dyn Storage>,
}

impl<D: Datum> Default for SorterBuilder<D> {
    fn default() -> Self {
        Self {
            ctx: None,
            key_arity: None,
            val_arity: None,
            buffer_capacity: None,
            descending: None,
            tmp_dir: None,
            workers: DEFAULT_WORKERS,
            storage: Arc::new(FsStorage::new()),
        }
    }
}

impl<D: Datum + Send + Sync + 'static> SorterBuilder<D>
where
    D::Ctx: Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// The comparator context the typed-value contract needs (collation,
    /// locale, numeric precision — opaque to this crate).
    pub fn statement_context(mut self, ctx: D::Ctx) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Number of key columns (`k`) and value columns (`v`) every row carries.
    pub fn schema(mut self, key_arity: usize, val_arity: usize) -> Self {
        self.key_arity = Some(key_arity);
        self.val_arity = Some(val_arity);
        self
    }

    /// Total row budget kept in memory across all workers before spilling.
    pub fn buffer(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Per-key-column sort direction; length must equal the key arity.
    pub fn descending(mut self, descending: Direction) -> Self {
        self.descending = Some(descending);
        self
    }

    /// Scratch directory for run files. Must already exist.
    pub fn tmp_dir(mut self, path: PathBuf) -> Self {
        self.tmp_dir = Some(path);
        self
    }

    /// Size of the Phase 1 worker pool. Defaults to 4.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Overrides the storage backend (defaults to the local filesystem).
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn build(self) -> Result<Sorter<D>> {
        let ctx = self
            .ctx
            .ok_or_else(|| SortError::Config("statement_context is required".into()))?;
        let key_arity = self
            .key_arity
            .ok_or_else(|| SortError::Config("schema (key arity) is required".into()))?;
        let val_arity = self
            .val_arity
            .ok_or_else(|| SortError::Config("schema (value arity) is required".into()))?;
        if key_arity == 0 {
            return Err(SortError::Config("key arity must be greater than zero".into()));
        }
        if val_arity == 0 {
            return Err(SortError::Config("value arity must be greater than zero".into()));
        }
        let buffer_capacity = self
            .buffer_capacity
            .ok_or_else(|| SortError::Config("buffer capacity is required".into()))?;
        if buffer_capacity == 0 {
            return Err(SortError::Config("buffer capacity must be positive".into()));
        }
        let descending = self
            .descending
            .ok_or_else(|| SortError::Config("descending vector is required".into()))?;
        if descending.len() != key_arity {
            return Err(SortError::Config(format!(
                "descending vector length {} does not match key arity {key_arity}",
                descending.len()
            )));
        }
        let tmp_dir = self
            .tmp_dir
            .ok_or_else(|| SortError::Config("tmp_dir is required".into()))?;
        if !self.storage.is_dir(&tmp_dir) {
            return Err(SortError::Config(format!(
                "tmp_dir {} does not exist",
                tmp_dir.display()
            )));
        }

        let worker_count = self.workers.max(1);
        let batch_capacity = (buffer_capacity / worker_count).max(1);

        let comparator = Arc::new(Comparator::new(ctx, descending));
        let registry = Arc::new(Mutex::new(FileRegistry::new()));
        let wait_group = Arc::new(WaitGroup::new());

        let workers: Vec<Arc<Worker<D>>> = (0..worker_count)
            .map(|_| {
                Arc::new(Worker::new(
                    batch_capacity,
                    Arc::clone(&comparator),
                    Arc::clone(&registry),
                    Arc::clone(&wait_group),
                    Arc::clone(&self.storage),
                    tmp_dir.clone(),
                ))
            })
            .collect();

        let dispatcher = Dispatcher::new(workers.clone());

        Ok(Sorter {
            key_arity,
            val_arity,
            comparator,
            dispatcher,
            workers,
            registry,
            wait_group,
            storage: self.storage,
            tmp_dir,
            phase: Mutex::new(PhaseState::Input),
            sticky_error: Mutex::new(None),
        })
    }
}

/// A single sort: feed rows in with [`input`](Self::input), then drain them
/// back out in order with [`output`](Self::output), then [`close`](Self::close)
/// to release the scratch directory. Input and Output are one-way: once
/// Output has been called, Input always fails with [`SortError::WrongPhase`].
pub struct Sorter<D: Datum> {
    key_arity: usize,
    val_arity: usize,
    comparator: Arc<Comparator<D>>,
    dispatcher: Dispatcher<D>,
    workers: Vec<Arc<Worker<D>>>,
    registry: Arc<Mutex<FileRegistry>>,
    wait_group: Arc<WaitGroup>,
    storage: Arc<dyn Storage>,
    tmp_dir: PathBuf,
    phase: Mutex<PhaseState<D>>,
    sticky_error: Mutex<Option<SortError>>,
}

impl<D: Datum + Send + Sync + 'static> Sorter<D>
where
    D::Ctx: Send + Sync,
{
    pub fn builder() -> SorterBuilder<D> {
        SorterBuilder::new()
    }

    /// Feed one row. Valid only in the Input phase.
    pub fn input(&self, key: Vec<D>, val: Vec<D>, handle: i64) -> Result<()> {
        if let Some(e) = self.sticky_error.lock().unwrap().clone() {
            return Err(e);
        }

        match &*self.phase.lock().unwrap() {
            PhaseState::Closed => return Err(SortError::AlreadyClosed),
            PhaseState::Output(_) => return Err(SortError::WrongPhase),
            PhaseState::Input => {}
        }

        if key.len() != self.key_arity || val.len() != self.val_arity {
            return Err(SortError::Config(format!(
                "row arity mismatch: expected ({}, {}), got ({}, {})",
                self.key_arity,
                self.val_arity,
                key.len(),
                val.len()
            )));
        }

        self.dispatcher.input(Row::new(key, val, handle))
    }

    /// Pull the next row in sorted order, or `Ok(None)` once exhausted. The
    /// first call drains every worker and opens the Phase 2 merge; the
    /// phase transition is one-way.
    pub fn output(&self) -> Result<Option<(Vec<D>, Vec<D>, i64)>> {
        if let Some(e) = self.sticky_error.lock().unwrap().clone() {
            return Err(e);
        }

        let mut guard = self.phase.lock().unwrap();
        if matches!(*guard, PhaseState::Closed) {
            return Err(SortError::AlreadyClosed);
        }
        if matches!(*guard, PhaseState::Input) {
            if let Err(e) = self.begin_output_phase(&mut guard) {
                *self.sticky_error.lock().unwrap() = Some(e.clone());
                return Err(e);
            }
        }

        match &mut *guard {
            PhaseState::Output(heap) => match heap.pop() {
                Ok(row) => Ok(row.map(|r| (r.key, r.val, r.handle))),
                Err(e) => {
                    *self.sticky_error.lock().unwrap() = Some(e.clone());
                    Err(e)
                }
            },
            _ => unreachable!("transitioned to Output above"),
        }
    }

    fn begin_output_phase(&self, guard: &mut std::sync::MutexGuard<'_, PhaseState<D>>) -> Result<()> {
        for w in &self.workers {
            w.drain();
        }
        self.wait_group.wait_zero();

        for w in &self.workers {
            if let Some(e) = w.take_error() {
                return Err(e);
            }
        }

        let files: Vec<PathBuf> = self.registry.lock().unwrap().files().to_vec();
        let mut cursors = Vec::with_capacity(files.len());
        for path in &files {
            cursors.push(RunCursor::new(self.storage.open_read(path)?));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(runs = files.len(), "entering output phase");

        let scratch_capacity = self.workers.iter().map(|w| w.row_size_max()).max().unwrap_or(0);
        let heap = MergeHeap::new(
            Arc::clone(&self.comparator),
            self.key_arity,
            self.val_arity,
            cursors,
            scratch_capacity,
        )?;

        **guard = PhaseState::Output(heap);
        Ok(())
    }

    /// Release resources: wait out any in-flight flush, drop open cursors,
    /// and remove the scratch directory. Idempotent is not allowed — a
    /// second call returns [`SortError::AlreadyClosed`].
    pub fn close(&self) -> Result<()> {
        let mut guard = self.phase.lock().unwrap();
        if matches!(*guard, PhaseState::Closed) {
            return Err(SortError::AlreadyClosed);
        }
        *guard = PhaseState::Closed;
        drop(guard);

        self.wait_group.wait_zero();
        self.storage.remove_dir_all(&self.tmp_dir)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(tmp_dir = %self.tmp_dir.display(), "closed sorter");

        Ok(())
    }
}

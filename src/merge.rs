//! Phase 2: k-way merge over the sorted run files.
//!
//! This is a hand-rolled binary heap, not
//! `std::collections::BinaryHeap`. `BinaryHeap` requires an infallible
//! `Ord`, which would force comparator errors to be silently swallowed
//! (typically by panicking or picking an arbitrary ordering) deep inside a
//! sift operation. Here every comparison the heap performs can fail, and a
//! failure is surfaced to the caller and then remembered, so a merge never
//! partially succeeds after a comparator error.

use std::sync::Arc;

use rowsort_core::row::Row;
use rowsort_core::value::Datum;
use rowsort_io::RunCursor;

use crate::comparator::Comparator;
use crate::error::{Result, SortError};

struct Slot<D: Datum> {
    cursor: RunCursor,
    head: Option<Row<D>>,
}

/// A fallible min-heap of run cursors, ordered by each cursor's current
/// head row.
pub struct MergeHeap<D: Datum> {
    comparator: Arc<Comparator<D>>,
    k: usize,
    v: usize,
    slots: Vec<Slot<D>>,
    heap: Vec<usize>,
    scratch: Vec<u8>,
    error: Option<SortError>,
}

impl<D: Datum> MergeHeap<D> {
    /// Builds the heap, reading one row from every cursor. Every run file
    /// registered by Phase 1 holds at least one row, so a cursor that is
    /// immediately empty is treated as a malformed merge input.
    pub fn new(
        comparator: Arc<Comparator<D>>,
        k: usize,
        v: usize,
        cursors: Vec<RunCursor>,
        scratch_capacity: usize,
    ) -> Result<Self> {
        let slots = cursors
            .into_iter()
            .map(|cursor| Slot { cursor, head: None })
            .collect();
        let mut heap = Self {
            comparator,
            k,
            v,
            slots,
            heap: Vec::new(),
            scratch: vec![0u8; scratch_capacity],
            error: None,
        };
        for idx in 0..heap.slots.len() {
            match heap.slots[idx].cursor.advance::<D>(&mut heap.scratch, heap.k, heap.v) {
                Ok(Some(row)) => {
                    heap.slots[idx].head = Some(row);
                    heap.push_heap(idx)?;
                }
                Ok(None) => return Err(SortError::EmptyRun),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(heap)
    }

    /// Pop the globally-next row, or `Ok(None)` once every run is exhausted.
    /// Once this returns `Err`, every later call returns the same error.
    pub fn pop(&mut self) -> Result<Option<Row<D>>> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        if self.heap.is_empty() {
            return Ok(None);
        }

        let top = self.heap[0];
        if let Err(e) = self.pop_heap() {
            self.error = Some(e.clone());
            return Err(e);
        }
        let row = self.slots[top].head.take().expect("heap member has a head row");

        match self.slots[top].cursor.advance::<D>(&mut self.scratch, self.k, self.v) {
            Ok(Some(next)) => {
                self.slots[top].head = Some(next);
                if let Err(e) = self.push_heap(top) {
                    self.error = Some(e.clone());
                    return Err(e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                let e: SortError = e.into();
                self.error = Some(e.clone());
                return Err(e);
            }
        }

        Ok(Some(row))
    }

    fn less(&self, a: usize, b: usize) -> Result<bool> {
        let ka = &self.slots[a].head.as_ref().expect("heap member has a head row").key;
        let kb = &self.slots[b].head.as_ref().expect("heap member has a head row").key;
        self.comparator.less(ka, kb)
    }

    fn push_heap(&mut self, slot: usize) -> Result<()> {
        self.heap.push(slot);
        let mut i = self.heap.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.less(self.heap[i], self.heap[parent])? {
                self.heap.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn pop_heap(&mut self) -> Result<()> {
        let last = self.heap.pop().expect("pop_heap called on a non-empty heap");
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.sift_down(0)?;
        }
        Ok(())
    }

    fn sift_down(&mut self, mut i: usize) -> Result<()> {
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < self.heap.len() && self.less(self.heap[l], self.heap[smallest])? {
                smallest = l;
            }
            if r < self.heap.len() && self.less(self.heap[r], self.heap[smallest])? {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.heap.swap(i, smallest);
            i = smallest;
        }
        Ok(())
    }
}

//! Column-by-column key comparison with a per-column direction vector.
//! Holds the `Datum::Ctx` as an owned value rather than reaching for
//! ambient/global state, so a `Comparator` can be built, passed around, and
//! torn down independently of any particular sort's lifetime.

use std::cmp::Ordering;

use rowsort_core::row::Direction;
use rowsort_core::value::Datum;

use crate::error::{Result, SortError};

pub struct Comparator<D: Datum> {
    ctx: D::Ctx,
    descending: Direction,
}

impl<D: Datum> Comparator<D> {
    pub fn new(ctx: D::Ctx, descending: Direction) -> Self {
        Self { ctx, descending }
    }

    /// Three-way compare of two key tuples, column by column, negating the
    /// ordering for columns marked descending. Stops at the first
    /// non-`Equal` column.
    pub fn cmp(&self, a: &[D], b: &[D]) -> Result<Ordering> {
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            let mut ord = D::compare(&self.ctx, x, y).map_err(SortError::from)?;
            if self.descending.get(i).copied().unwrap_or(false) {
                ord = ord.reverse();
            }
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    pub fn less(&self, a: &[D], b: &[D]) -> Result<bool> {
        Ok(self.cmp(a, b)? == Ordering::Less)
    }
}

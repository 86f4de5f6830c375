#![forbid(unsafe_code)]
//! `rowsort`: an external sort engine for tabular rows that do not fit in
//! memory.
//!
//! A [`Sorter`] accepts rows of a fixed key/value/handle shape, spills
//! sorted batches to run files on a worker pool as memory fills
//! (`Sorter::input`), then streams them back out in global sorted order via
//! a k-way merge (`Sorter::output`). See [`SorterBuilder`] for configuration
//! and `prelude` for the common import set.

pub mod comparator;
pub mod dispatcher;
pub mod error;
pub mod merge;
pub mod registry;
pub mod sorter;
pub mod wait_group;
pub mod worker;

pub use rowsort_core::value::{Datum, Value};
pub use rowsort_core::row::Direction;

pub mod prelude {
    pub use crate::error::{Result, SortError};
    pub use crate::sorter::{Sorter, SorterBuilder};
    pub use crate::{Datum, Direction, Value};
}

//! A headless virtualization engine for very large tables.
//!
//! For the presentation-facing pieces (scrollbars, the frame-driven grid), see the
//! `tablegrid-adapter` crate.
//!
//! This crate holds the algorithms needed to keep a table of millions of rows interactive:
//! - a pure viewport calculation over a row height and resizable column widths
//! - a bounded element pool that recycles visuals as the window scrolls
//! - a view manager that filters and sorts on a background thread, exchanging results with the
//!   interactive context through a fixed-capacity shared index buffer
//!
//! It is UI-agnostic. The presentation layer provides viewport size, scroll offsets and the
//! concrete elements behind [`Recyclable`].
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod buffer;
mod columns;
mod dataset;
mod error;
mod fenwick;
mod filter;
mod manager;
mod options;
mod pool;
mod sort;
mod types;
mod view;
mod viewport;
mod worker;

#[cfg(test)]
mod tests;

pub use buffer::{DEFAULT_BUFFER_CAPACITY, PublishedView, SharedIndexBuffer};
pub use columns::ColumnModel;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use filter::RowFilter;
pub use manager::{ComputeCapability, ViewChange, ViewManager, ViewPhase};
pub use options::ViewOptions;
pub use pool::{ElementPool, ReconcileStats, Recyclable};
pub use sort::{Cancelled, compare_rows, compare_values, sort_by};
pub use types::{Axis, Cell, CellId, CellValue, Row, RowId};
pub use view::{SortDirection, SortKey, ViewConfig};
pub use viewport::{MIN_THUMB_SIZE_X, ViewportInput, ViewportState};
pub use worker::Completion;

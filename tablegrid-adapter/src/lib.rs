//! Presentation-side pieces for the `tablegrid` crate.
//!
//! `tablegrid` computes viewports, pools elements and runs filter/sort in the background. This
//! crate drives those pieces frame by frame against an abstract [`Presenter`]:
//!
//! - [`Grid`]: owns offsets, columns and elements, and renders pinned filter/header rows plus the
//!   visible data rows
//! - [`ScrollbarController`]: wheel heuristics with per-frame batching, thumb drags and track
//!   presses
//!
//! It is framework-agnostic: the host implements [`Presenter`] over whatever it paints with.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod grid;
mod options;
mod presenter;
mod scrollbar;


pub use grid::{Frame, Grid};
pub use options::{
    DEFAULT_MIN_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT, GridOptions, ReachBottomCallback,
};
pub use presenter::{CellKind, Content, ElementKind, Presenter};
pub use scrollbar::{
    SCROLLBAR_THICKNESS, ScrollbarController, axis_geometry, normalize_wheel, reached_bottom,
    thumb_to_offset,
};

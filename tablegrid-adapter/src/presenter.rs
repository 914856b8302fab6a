use tablegrid::{Axis, CellValue, SortDirection};

/// Which cell renderer an element uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    /// A dataset cell.
    Data,
    /// A column label with its sort indicator.
    Header,
    /// A filter input showing the column's query.
    Filter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Row,
    Cell(CellKind),
    Thumb(Axis),
}

/// What an element displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Content<'a> {
    /// Row chrome. `absolute_index` is the 1-based position in the current view (zebra striping).
    Row { absolute_index: usize },
    Cell(&'a CellValue),
    Header {
        label: &'a str,
        sort: Option<SortDirection>,
    },
    Filter { query: &'a str },
}

/// The presentation layer the grid paints through.
///
/// The grid never holds on to anything but handles: it calls into the presenter with explicit
/// commands, and positions are relative to the parent (cells inside their row, rows and thumbs
/// inside the viewport).
pub trait Presenter {
    type Handle;

    /// Creates an element. Cells get their row as `parent`.
    fn create(&mut self, kind: ElementKind, id: u64, parent: Option<&Self::Handle>) -> Self::Handle;

    /// Moves an element; `None` leaves that axis unchanged.
    fn set_position(&mut self, handle: &Self::Handle, x: Option<f64>, y: Option<f64>);

    fn set_size(&mut self, handle: &Self::Handle, width: f64, height: f64);

    fn set_content(&mut self, handle: &Self::Handle, content: Content<'_>);

    fn destroy(&mut self, handle: Self::Handle);
}

use core::ops::Range;

use crate::ColumnModel;

/// Minimum horizontal thumb length in pixels.
pub const MIN_THUMB_SIZE_X: f64 = 30.0;

/// Inputs of the viewport calculation.
///
/// `row_count` is the number of rows in the current view: the natural dataset length, or the
/// published count of an active filtered/sorted view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportInput {
    pub offset_x: f64,
    pub offset_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub row_height: f64,
    pub row_count: usize,
}

/// The visible window of the table plus scrollbar geometry.
///
/// This is a plain `Copy` value; recomputing it is cheap and allocation-free, so callers
/// recompute on every access instead of tracking invalidation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub start_row: usize,
    /// Exclusive.
    pub end_row: usize,
    /// Sub-pixel shift of the first visible row, in `(-row_height, 0]`.
    pub row_offset: f64,

    pub start_cell: usize,
    /// Exclusive.
    pub end_cell: usize,
    /// Sub-pixel shift of the first visible column, in `(-width(start_cell), 0]`.
    pub cell_offset: f64,

    pub scrollable_height: f64,
    pub table_height: f64,
    pub thumb_offset_y: f64,
    pub thumb_size_y: f64,

    pub scrollable_width: f64,
    pub table_width: f64,
    pub thumb_offset_x: f64,
    pub thumb_size_x: f64,

    pub rows_per_viewport: usize,
    /// Columns needed to cover the viewport, including one buffer column.
    pub cells_per_row: usize,
}

impl ViewportState {
    /// Computes the window for `input` over `columns`.
    pub fn compute(input: &ViewportInput, columns: &ColumnModel) -> Self {
        let offset_x = non_negative(input.offset_x);
        let offset_y = non_negative(input.offset_y);
        let viewport_width = non_negative(input.viewport_width);
        let viewport_height = non_negative(input.viewport_height);
        let row_count = input.row_count;

        let mut s = Self::default();

        // Rows.
        let row_height = input.row_height;
        if row_height > 0.0 {
            s.rows_per_viewport = (viewport_height / row_height).ceil() as usize;
            s.start_row = ((offset_y / row_height).floor() as usize).min(row_count);
            s.end_row = s
                .start_row
                .saturating_add(s.rows_per_viewport)
                .min(row_count);
            s.row_offset = -(offset_y % row_height);
            s.table_height = row_count as f64 * row_height;
        }
        s.scrollable_height = (s.table_height - viewport_height).max(0.0);

        // Columns.
        let column_count = columns.len();
        if column_count > 0 {
            let start_cell = columns.boundary_at(offset_x).min(column_count - 1);
            let last_boundary = columns.boundary_at(offset_x + viewport_width).max(start_cell);
            s.start_cell = start_cell;
            s.cells_per_row = last_boundary - start_cell + 2;
            s.end_cell = (start_cell + s.cells_per_row).min(column_count);
            s.cell_offset = -(offset_x - columns.start(start_cell) as f64);
        }
        s.table_width = columns.total_width() as f64;
        s.scrollable_width = (s.table_width - viewport_width).max(0.0);

        // Vertical thumb shrinks with sqrt(viewport/table) so small changes in row count still
        // move its size.
        let pct_y = if s.table_height == 0.0 {
            1.0
        } else {
            0.97 * (viewport_height / s.table_height).sqrt() + 0.03
        };
        s.thumb_size_y = (pct_y * viewport_height).clamp(0.0, viewport_height).round();
        s.thumb_offset_y = thumb_offset(
            offset_y,
            s.scrollable_height,
            viewport_height,
            s.thumb_size_y,
        );

        let pct_x = if s.table_width == 0.0 {
            1.0
        } else {
            viewport_width / s.table_width
        };
        s.thumb_size_x = (pct_x * viewport_width)
            .min(viewport_width)
            .max(MIN_THUMB_SIZE_X)
            .round();
        s.thumb_offset_x = thumb_offset(
            offset_x,
            s.scrollable_width,
            viewport_width,
            s.thumb_size_x,
        );

        s
    }

    pub fn visible_rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    pub fn visible_cells(&self) -> Range<usize> {
        self.start_cell..self.end_cell
    }

    /// Clamps scroll offsets into `[0, scrollable]` for both axes.
    pub fn clamp_offsets(&self, offset_x: f64, offset_y: f64) -> (f64, f64) {
        (
            non_negative(offset_x).min(self.scrollable_width),
            non_negative(offset_y).min(self.scrollable_height),
        )
    }
}

/// Track position of a thumb, corrected by the thumb's own size so it stays inside the track at
/// both ends.
fn thumb_offset(offset: f64, scrollable: f64, track: f64, thumb: f64) -> f64 {
    if scrollable == 0.0 {
        return 0.0;
    }
    let t = offset / scrollable;
    t * track - thumb * t
}

fn non_negative(v: f64) -> f64 {
    if v > 0.0 { v } else { 0.0 }
}

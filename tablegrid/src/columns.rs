use crate::fenwick::Fenwick;
use crate::{Error, Result};

/// Ordered column pixel widths.
///
/// Widths are user-resizable at runtime; every change is visible to the next
/// [`crate::ViewportState::compute`] call since the calculator reads prefix sums from here.
#[derive(Clone, Debug, Default)]
pub struct ColumnModel {
    widths: Vec<u32>,
    sums: Fenwick,
}

impl ColumnModel {
    pub fn new(widths: impl Into<Vec<u32>>) -> Self {
        let widths = widths.into();
        let sums = Fenwick::from_widths(&widths);
        Self { widths, sums }
    }

    /// `count` columns of the same width.
    pub fn uniform(count: usize, width: u32) -> Self {
        Self::new(vec![width; count])
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn width(&self, column: usize) -> Option<u32> {
        self.widths.get(column).copied()
    }

    /// Left edge of `column` in content coordinates. `start(len())` is the table width.
    pub fn start(&self, column: usize) -> u64 {
        self.sums.prefix_sum(column)
    }

    pub fn total_width(&self) -> u64 {
        self.sums.total()
    }

    /// Index of the rightmost column boundary `k` (in `0..=len()`) with `start(k) <= x`.
    ///
    /// Negative offsets map to 0.
    pub fn boundary_at(&self, x: f64) -> usize {
        if self.widths.is_empty() || x <= 0.0 {
            return 0;
        }
        // Boundaries are integral, so `start(k) <= x` iff `start(k) <= floor(x)`.
        let target = if x >= u64::MAX as f64 {
            u64::MAX
        } else {
            x.floor() as u64
        };
        self.sums.rightmost_start_at_or_before(target)
    }

    /// Returns the previous width.
    pub fn set_width(&mut self, column: usize, width: u32) -> Result<u32> {
        let count = self.widths.len();
        let Some(slot) = self.widths.get_mut(column) else {
            return Err(Error::ColumnOutOfRange {
                index: column,
                count,
            });
        };
        let prev = *slot;
        *slot = width;
        self.sums.add(column, width as i64 - prev as i64);
        Ok(prev)
    }

    pub fn push(&mut self, width: u32) {
        self.widths.push(width);
        self.sums.push(width);
    }

    pub fn set_widths(&mut self, widths: impl Into<Vec<u32>>) {
        *self = Self::new(widths);
    }
}

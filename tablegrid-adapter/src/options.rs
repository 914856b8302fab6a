use std::sync::Arc;

use tablegrid::{Error, Result, ViewOptions};

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 32.0;

/// Default lower bound for [`crate::Grid::resize_column`].
pub const DEFAULT_MIN_COLUMN_WIDTH: u32 = 30;

/// A callback fired when the vertical offset reaches the bottom of a scrollable table.
///
/// Hosts typically use it to stream more rows in with [`crate::Grid::append`].
pub type ReachBottomCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration for [`crate::Grid`].
#[derive(Clone)]
pub struct GridOptions {
    pub row_height: f64,
    /// Width of the visible area, in pixels.
    pub viewport_width: f64,
    /// Height of the visible area including the header rows, in pixels.
    pub viewport_height: f64,
    pub min_column_width: u32,
    /// Pin a filter row and a header row above the data rows.
    pub header_rows: bool,
    pub view: ViewOptions,
    pub on_reach_bottom: Option<ReachBottomCallback>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            viewport_width: 800.0,
            viewport_height: 600.0,
            min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            header_rows: true,
            view: ViewOptions::default(),
            on_reach_bottom: None,
        }
    }
}

impl GridOptions {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    pub fn with_view(mut self, view: ViewOptions) -> Self {
        self.view = view;
        self
    }

    pub fn with_header_rows(mut self, header_rows: bool) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_on_reach_bottom(
        mut self,
        on_reach_bottom: Option<impl Fn() + Send + Sync + 'static>,
    ) -> Self {
        self.on_reach_bottom = on_reach_bottom.map(|f| Arc::new(f) as _);
        self
    }

    /// Number of pinned rows above the data area.
    pub fn header_row_count(&self) -> usize {
        if self.header_rows { 2 } else { 0 }
    }

    pub fn header_height(&self) -> f64 {
        self.header_row_count() as f64 * self.row_height
    }

    /// Height available to data rows. This is also the vertical scrollbar track.
    pub fn data_height(&self) -> f64 {
        (self.viewport_height - self.header_height()).max(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("row_height must be positive, got {}", self.row_height),
            });
        }
        for (name, v) in [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {v}"),
                });
            }
        }
        self.view.validate()
    }
}

impl core::fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridOptions")
            .field("row_height", &self.row_height)
            .field("viewport_width", &self.viewport_width)
            .field("viewport_height", &self.viewport_height)
            .field("min_column_width", &self.min_column_width)
            .field("header_rows", &self.header_rows)
            .field("view", &self.view)
            .field("on_reach_bottom", &self.on_reach_bottom.is_some())
            .finish()
    }
}

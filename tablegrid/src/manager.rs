use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::RecvTimeoutError;

use crate::buffer::{PublishedView, SharedIndexBuffer};
use crate::worker::{BackgroundView, Completion, Request};
use crate::{Dataset, Result, Row, ViewConfig, ViewOptions};

/// Whether filter/sort can run off the interactive context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeCapability {
    Background,
    /// No worker: filter/sort configurations are recorded but rows stay in natural order.
    Unavailable,
}

/// Where the view pipeline currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    /// No filter and no sort.
    Natural,
    /// A computation for `version` was dispatched and has not been honored yet. The previously
    /// published view (if any) is still displayed.
    ComputePending { version: u64 },
    Active { version: u64, count: usize },
}

/// Outcome of a view or dataset mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum ViewChange {
    /// Nothing changed.
    Unchanged,
    /// Rows are now shown in natural order; the caller should re-render immediately.
    Natural,
    /// A background computation was requested.
    Dispatched { version: u64 },
}

impl ViewChange {
    /// `true` if the caller must refresh the viewport now rather than wait for a completion.
    pub fn needs_render(self) -> bool {
        matches!(self, Self::Natural)
    }
}

/// Owns the dataset, the filter/sort configuration, the shared index buffer and the background
/// worker, and decides which row is shown at each visible index.
#[derive(Debug)]
pub struct ViewManager {
    options: ViewOptions,
    dataset: Dataset,
    config: ViewConfig,
    clock: u64,
    buffer: Arc<SharedIndexBuffer>,
    published: Option<PublishedView>,
    worker: Option<BackgroundView>,
}

impl ViewManager {
    pub fn new(options: ViewOptions) -> Result<Self> {
        options.validate()?;
        let buffer = Arc::new(SharedIndexBuffer::new(options.buffer_capacity));
        let worker = if options.background {
            match BackgroundView::spawn(Arc::clone(&buffer)) {
                Ok(worker) => Some(worker),
                Err(_err) => {
                    vwarn!(
                        error = %_err,
                        "background view computation unavailable; filter and sort keep natural order"
                    );
                    None
                }
            }
        } else {
            vdebug!("background view computation disabled");
            None
        };
        Ok(Self {
            dataset: Dataset::new(options.buffer_capacity),
            options,
            config: ViewConfig::default(),
            clock: 0,
            buffer,
            published: None,
            worker,
        })
    }

    pub fn with_rows(options: ViewOptions, rows: Vec<Row>) -> Result<Self> {
        let mut m = Self::new(options)?;
        let change = m.replace_all(rows)?;
        debug_assert_eq!(change, ViewChange::Natural);
        Ok(m)
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn capability(&self) -> ComputeCapability {
        if self.worker.is_some() {
            ComputeCapability::Background
        } else {
            ComputeCapability::Unavailable
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SharedIndexBuffer {
        &self.buffer
    }

    pub fn published(&self) -> Option<PublishedView> {
        self.published
    }

    pub fn is_view_active(&self) -> bool {
        self.published.is_some()
    }

    pub fn phase(&self) -> ViewPhase {
        if self.config.is_empty() || self.worker.is_none() {
            return ViewPhase::Natural;
        }
        match self.published {
            Some(p) if p.version == self.config.version => ViewPhase::Active {
                version: p.version,
                count: p.count,
            },
            _ => ViewPhase::ComputePending {
                version: self.config.version,
            },
        }
    }

    /// Number of rows in the current view: the published count, or the dataset length.
    pub fn row_count(&self) -> usize {
        match &self.published {
            Some(view) => view.count,
            None => self.dataset.len(),
        }
    }

    /// Natural dataset position of the row displayed at view index `index`.
    pub fn row_position(&self, index: usize) -> Option<usize> {
        match &self.published {
            Some(view) => self.buffer.load(view, index),
            None => (index < self.dataset.len()).then_some(index),
        }
    }

    /// Row displayed at view index `index`.
    ///
    /// A published position that does not resolve to a row means the buffer and the dataset are
    /// out of sync; it is logged and the row is skipped.
    pub fn row_at(&self, index: usize) -> Option<&Row> {
        let position = self.row_position(index)?;
        self.row_at_position(index, position)
    }

    /// Resolves the view indices in `range` to `(index, position, row)`, skipping indices whose
    /// position has no row behind it.
    pub fn resolve(&self, range: Range<usize>) -> impl Iterator<Item = (usize, usize, &Row)> + '_ {
        range.filter_map(move |index| {
            let position = self.row_position(index)?;
            let row = self.row_at_position(index, position)?;
            Some((index, position, row))
        })
    }

    fn row_at_position(&self, _index: usize, position: usize) -> Option<&Row> {
        let row = self.dataset.get(position);
        if row.is_none() {
            vwarn!(
                index = _index,
                position,
                rows = self.dataset.len(),
                "view index references a missing row"
            );
        }
        row
    }

    /// Sets or clears (`None` or an empty query) the filter of `column`.
    pub fn set_filter(&mut self, column: usize, query: Option<&str>) -> ViewChange {
        if !self.config.set_filter(column, query) {
            return ViewChange::Unchanged;
        }
        self.update_view()
    }

    /// Cycles the sort of `column` through none → descending → ascending → none.
    pub fn toggle_sort(&mut self, column: usize) -> ViewChange {
        let _direction = self.config.toggle_sort(column);
        vtrace!(column, direction = ?_direction, "toggle_sort");
        self.update_view()
    }

    /// Replaces the dataset.
    ///
    /// The view falls back to natural order until a computation over the new rows completes.
    pub fn replace_all(&mut self, rows: Vec<Row>) -> Result<ViewChange> {
        let copy = self.worker.as_ref().map(|_| rows.clone());
        self.dataset.replace_all(rows)?;
        vdebug!(rows = self.dataset.len(), "replace_all");
        if let Some(copy) = copy {
            self.send(Request::SetRows(copy));
        }
        self.published = None;
        Ok(self.update_view())
    }

    /// Appends rows to the dataset.
    ///
    /// Only the new rows are copied to the worker.
    pub fn append(&mut self, rows: Vec<Row>) -> Result<ViewChange> {
        if rows.is_empty() {
            return Ok(ViewChange::Unchanged);
        }
        let copy = self.worker.as_ref().map(|_| rows.clone());
        self.dataset.append(rows)?;
        vdebug!(rows = self.dataset.len(), "append");
        if let Some(copy) = copy {
            self.send(Request::AppendRows(copy));
        }
        self.published = None;
        Ok(self.update_view())
    }

    /// Drains completions without blocking.
    ///
    /// Returns the newly honored view, if any. Stale completions are discarded.
    pub fn poll(&mut self) -> Option<PublishedView> {
        let mut honored = None;
        while let Some(done) = self.worker.as_ref().and_then(BackgroundView::try_recv) {
            if let Some(view) = self.honor(done) {
                honored = Some(view);
            }
        }
        honored
    }

    /// Blocks until a completion is honored or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<PublishedView> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let done = match self.worker.as_ref()?.recv_timeout(remaining) {
                Ok(done) => done,
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    vwarn!("view worker disconnected");
                    self.worker = None;
                    self.published = None;
                    return None;
                }
            };
            if let Some(view) = self.honor(done) {
                return Some(view);
            }
        }
    }

    /// Accepts `done` only if it belongs to the latest version and its region still carries it.
    pub(crate) fn honor(&mut self, done: Completion) -> Option<PublishedView> {
        if done.version != self.config.version || self.config.is_empty() {
            vdebug!(
                version = done.version,
                latest = self.config.version,
                "discarding stale view result"
            );
            return None;
        }
        let Some(count) = self.buffer.published(done.region, done.version) else {
            vwarn!(
                version = done.version,
                region = done.region,
                "view result overwritten before it was honored"
            );
            return None;
        };
        self.buffer.pin(done.region);
        let view = PublishedView {
            version: done.version,
            region: done.region,
            count,
        };
        vdebug!(version = view.version, count, "view active");
        self.published = Some(view);
        Some(view)
    }

    fn update_view(&mut self) -> ViewChange {
        self.clock += 1;
        let version = self.clock;
        self.config.version = version;
        // Bumping the latest version is what cancels an in-flight computation.
        self.buffer.set_latest_version(version);

        if self.config.is_empty() {
            self.published = None;
            vdebug!(version, "view cleared");
            return ViewChange::Natural;
        }
        if self.worker.is_none() {
            self.published = None;
            return ViewChange::Natural;
        }
        if !self.send(Request::Compute(self.config.clone())) {
            self.published = None;
            return ViewChange::Natural;
        }
        vdebug!(version, "compute view dispatched");
        ViewChange::Dispatched { version }
    }

    fn send(&mut self, request: Request) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        if worker.send(request) {
            return true;
        }
        vwarn!("view worker disconnected; falling back to natural order");
        self.worker = None;
        false
    }
}

use std::time::Duration;

use tablegrid::{
    Axis, CellId, ColumnModel, ElementPool, Error, PublishedView, ReconcileStats, Recyclable,
    Result, Row, RowId, ViewChange, ViewConfig, ViewManager, ViewportInput, ViewportState,
};

use crate::presenter::{CellKind, Content, ElementKind, Presenter};
use crate::scrollbar::{SCROLLBAR_THICKNESS, ScrollbarController, reached_bottom};
use crate::GridOptions;

const FILTER_ROW_ID: RowId = u64::MAX;
const HEADER_ROW_ID: RowId = u64::MAX - 1;

const THUMB_X_ID: u64 = 0;
const THUMB_Y_ID: u64 = 1;

/// What a [`Grid::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// A filter/sort result that became active this frame.
    pub view: Option<PublishedView>,
    /// Accumulated wheel input was applied.
    pub scrolled: bool,
}

/// A visible data row: its index in the current view and its natural dataset position.
#[derive(Clone, Copy, Debug)]
struct WindowRow {
    index: usize,
    position: usize,
}

#[derive(Clone, Copy)]
enum CellSource<'a> {
    Data(&'a Row),
    Header {
        labels: &'a [String],
        config: &'a ViewConfig,
    },
    Filter(&'a ViewConfig),
}

impl<'a> CellSource<'a> {
    /// Data cells keep their dataset id; header and filter cells are keyed by column.
    fn cell_id(self, column: usize) -> Option<CellId> {
        match self {
            Self::Data(row) => row.cell(column).map(|c| c.id),
            Self::Header { .. } | Self::Filter(_) => Some(column as CellId),
        }
    }

    fn content(self, column: usize) -> Option<Content<'a>> {
        match self {
            Self::Data(row) => row.cell(column).map(|c| Content::Cell(&c.value)),
            Self::Header { labels, config } => Some(Content::Header {
                label: labels.get(column).map_or("", String::as_str),
                sort: config.sort_for(column),
            }),
            Self::Filter(config) => Some(Content::Filter {
                query: config.filter_for(column).unwrap_or(""),
            }),
        }
    }
}

#[derive(Debug)]
struct CellElement<H> {
    handle: H,
    column: usize,
    x: f64,
    width: f64,
}

struct CellFrame<'a, P: Presenter> {
    presenter: &'a mut P,
    parent: &'a P::Handle,
    source: CellSource<'a>,
    kind: CellKind,
    columns: &'a ColumnModel,
    /// Column of each reconcile slot.
    slots: &'a [usize],
    /// Content x of the row's left edge.
    origin: f64,
    row_height: f64,
}

impl<H> CellElement<H> {
    fn layout<P: Presenter<Handle = H>>(&mut self, ctx: &mut CellFrame<'_, P>, force: bool) {
        let x = ctx.columns.start(self.column) as f64 - ctx.origin;
        if force || x != self.x {
            ctx.presenter
                .set_position(&self.handle, Some(x), force.then_some(0.0));
            self.x = x;
        }
        let width = ctx.columns.width(self.column).unwrap_or(0) as f64;
        if force || width != self.width {
            ctx.presenter.set_size(&self.handle, width, ctx.row_height);
            self.width = width;
        }
    }

    fn refresh<P: Presenter<Handle = H>>(&self, ctx: &mut CellFrame<'_, P>) {
        if let Some(content) = ctx.source.content(self.column) {
            ctx.presenter.set_content(&self.handle, content);
        }
    }
}

impl<'a, P: Presenter> Recyclable<CellFrame<'a, P>> for CellElement<P::Handle> {
    type Id = CellId;

    fn create(ctx: &mut CellFrame<'a, P>, id: CellId, slot: usize) -> Self {
        let handle = ctx
            .presenter
            .create(ElementKind::Cell(ctx.kind), id, Some(ctx.parent));
        let mut cell = Self {
            handle,
            column: ctx.slots[slot],
            x: 0.0,
            width: 0.0,
        };
        cell.layout(ctx, true);
        cell.refresh(ctx);
        cell
    }

    fn assign(&mut self, ctx: &mut CellFrame<'a, P>, _id: CellId, slot: usize) {
        self.column = ctx.slots[slot];
        self.layout(ctx, true);
        self.refresh(ctx);
    }

    fn place(&mut self, ctx: &mut CellFrame<'a, P>, slot: usize) {
        self.column = ctx.slots[slot];
        self.layout(ctx, false);
        // Labels, sort arrows and queries change under the same ids.
        if ctx.kind != CellKind::Data {
            self.refresh(ctx);
        }
    }

    fn destroy(self, ctx: &mut CellFrame<'a, P>) {
        ctx.presenter.destroy(self.handle);
    }
}

#[derive(Debug)]
struct RowElement<H> {
    handle: H,
    kind: CellKind,
    y: f64,
    absolute_index: usize,
    cells: ElementPool<CellId, CellElement<H>>,
    cell_ids: Vec<CellId>,
    cell_columns: Vec<usize>,
}

struct RowFrame<'a, P: Presenter> {
    presenter: &'a mut P,
    manager: &'a ViewManager,
    columns: &'a ColumnModel,
    state: &'a ViewportState,
    window: &'a [WindowRow],
    row_height: f64,
    /// Height of the pinned header rows.
    top: f64,
    width: f64,
}

impl<'a, P: Presenter> RowFrame<'a, P> {
    fn y(&self, slot: usize) -> f64 {
        let index = self.window[slot].index;
        self.top
            + self.state.row_offset
            + index.saturating_sub(self.state.start_row) as f64 * self.row_height
    }

    fn row(&self, slot: usize) -> Option<&'a Row> {
        let manager: &'a ViewManager = self.manager;
        manager.dataset().get(self.window[slot].position)
    }
}

impl<H> RowElement<H> {
    fn new(handle: H, kind: CellKind) -> Self {
        Self {
            handle,
            kind,
            y: 0.0,
            absolute_index: 0,
            cells: ElementPool::new(),
            cell_ids: Vec::new(),
            cell_columns: Vec::new(),
        }
    }

    /// Positions a data row for `slot`; a `fresh` row also rewrites its content and cells.
    fn show<P: Presenter<Handle = H>>(
        &mut self,
        ctx: &mut RowFrame<'_, P>,
        slot: usize,
        fresh: bool,
    ) {
        let y = ctx.y(slot);
        if fresh || y != self.y {
            ctx.presenter.set_position(&self.handle, Some(0.0), Some(y));
            self.y = y;
        }
        let absolute_index = ctx.window[slot].index + 1;
        if fresh || absolute_index != self.absolute_index {
            ctx.presenter
                .set_content(&self.handle, Content::Row { absolute_index });
            self.absolute_index = absolute_index;
        }
        if fresh {
            if let Some(row) = ctx.row(slot) {
                self.render_cells(
                    &mut *ctx.presenter,
                    CellSource::Data(row),
                    ctx.columns,
                    ctx.state,
                    ctx.row_height,
                );
            }
        }
    }

    /// Reconciles the cells of this row against the visible column window.
    fn render_cells<P: Presenter<Handle = H>>(
        &mut self,
        presenter: &mut P,
        source: CellSource<'_>,
        columns: &ColumnModel,
        state: &ViewportState,
        row_height: f64,
    ) -> ReconcileStats {
        self.cell_ids.clear();
        self.cell_columns.clear();
        for column in state.visible_cells() {
            if let Some(id) = source.cell_id(column) {
                self.cell_ids.push(id);
                self.cell_columns.push(column);
            }
        }
        let mut ctx = CellFrame {
            presenter,
            parent: &self.handle,
            source,
            kind: self.kind,
            columns,
            slots: &self.cell_columns,
            origin: columns.start(state.start_cell) as f64 - state.cell_offset,
            row_height,
        };
        self.cells.reconcile(&mut ctx, &self.cell_ids)
    }

    /// Destroys the cells, then the row.
    fn release<P: Presenter<Handle = H>>(mut self, presenter: &mut P) {
        for cell in self.cells.drain() {
            presenter.destroy(cell.handle);
        }
        presenter.destroy(self.handle);
    }
}

impl<'a, P: Presenter> Recyclable<RowFrame<'a, P>> for RowElement<P::Handle> {
    type Id = RowId;

    fn create(ctx: &mut RowFrame<'a, P>, id: RowId, slot: usize) -> Self {
        let handle = ctx.presenter.create(ElementKind::Row, id, None);
        ctx.presenter.set_size(&handle, ctx.width, ctx.row_height);
        let mut row = Self::new(handle, CellKind::Data);
        row.show(ctx, slot, true);
        row
    }

    fn assign(&mut self, ctx: &mut RowFrame<'a, P>, _id: RowId, slot: usize) {
        // Cell ids of the previous row may collide with this row's; rewrite all of them.
        self.cells.recycle_all();
        self.show(ctx, slot, true);
    }

    fn place(&mut self, ctx: &mut RowFrame<'a, P>, slot: usize) {
        self.show(ctx, slot, false);
    }

    fn destroy(self, ctx: &mut RowFrame<'a, P>) {
        self.release(&mut *ctx.presenter);
    }
}

#[derive(Debug)]
struct Thumbs<H> {
    x: H,
    y: H,
}

/// A frame-driven virtualized table.
///
/// The grid owns the column model, the [`ViewManager`], the scroll offsets and every element it
/// has created. It never stores the presenter: each operation receives it explicitly and emits
/// the minimal set of create/move/resize/content/destroy commands.
///
/// Typical loop:
/// - forward wheel input to [`Grid::on_wheel`] as it arrives
/// - call [`Grid::tick`] once per frame (applies the wheel input and any finished filter/sort)
#[derive(Debug)]
pub struct Grid<H> {
    options: GridOptions,
    columns: ColumnModel,
    labels: Vec<String>,
    manager: ViewManager,
    offset_x: f64,
    offset_y: f64,
    rows: ElementPool<RowId, RowElement<H>>,
    headers: Vec<RowElement<H>>,
    thumbs: Thumbs<H>,
    scrollbar: ScrollbarController,
    window: Vec<WindowRow>,
    row_ids: Vec<RowId>,
}

impl<H> Grid<H> {
    /// Builds the grid and renders the first frame.
    ///
    /// `labels` holds one header label per column.
    pub fn new<P: Presenter<Handle = H>>(
        options: GridOptions,
        columns: ColumnModel,
        labels: Vec<String>,
        rows: Vec<Row>,
        presenter: &mut P,
    ) -> Result<Self> {
        options.validate()?;
        if labels.len() != columns.len() {
            return Err(Error::InvalidConfig {
                message: format!("{} labels for {} columns", labels.len(), columns.len()),
            });
        }
        let manager = ViewManager::with_rows(options.view.clone(), rows)?;

        let thumbs = Thumbs {
            x: presenter.create(ElementKind::Thumb(Axis::Horizontal), THUMB_X_ID, None),
            y: presenter.create(ElementKind::Thumb(Axis::Vertical), THUMB_Y_ID, None),
        };

        let mut headers = Vec::new();
        if options.header_rows {
            let pinned = [
                (FILTER_ROW_ID, CellKind::Filter),
                (HEADER_ROW_ID, CellKind::Header),
            ];
            for (i, (id, kind)) in pinned.into_iter().enumerate() {
                let handle = presenter.create(ElementKind::Row, id, None);
                presenter.set_size(&handle, options.viewport_width, options.row_height);
                presenter.set_position(&handle, Some(0.0), Some(i as f64 * options.row_height));
                headers.push(RowElement::new(handle, kind));
            }
        }

        let mut grid = Self {
            options,
            columns,
            labels,
            manager,
            offset_x: 0.0,
            offset_y: 0.0,
            rows: ElementPool::new(),
            headers,
            thumbs,
            scrollbar: ScrollbarController::new(),
            window: Vec::new(),
            row_ids: Vec::new(),
        };
        grid.render_rows(presenter);
        let state = grid.state();
        grid.render_headers(presenter, &state);
        grid.refresh_thumbs(presenter);
        vdebug!(
            rows = grid.manager.dataset().len(),
            columns = grid.columns.len(),
            "grid mounted"
        );
        Ok(grid)
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn manager(&self) -> &ViewManager {
        &self.manager
    }

    pub fn scrollbar(&self) -> &ScrollbarController {
        &self.scrollbar
    }

    /// Current `(x, y)` scroll offsets.
    pub fn offsets(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Ids of the data rows rendered by the last row pass, top to bottom.
    pub fn visible_row_ids(&self) -> &[RowId] {
        &self.row_ids
    }

    /// Number of live data row elements.
    pub fn row_elements(&self) -> usize {
        self.rows.len()
    }

    /// Recomputed on every call; nothing is cached.
    pub fn state(&self) -> ViewportState {
        ViewportState::compute(
            &ViewportInput {
                offset_x: self.offset_x,
                offset_y: self.offset_y,
                viewport_width: self.options.viewport_width,
                viewport_height: self.options.data_height(),
                row_height: self.options.row_height,
                row_count: self.manager.row_count(),
            },
            &self.columns,
        )
    }

    /// Queues a wheel event for the next [`Grid::tick`].
    pub fn on_wheel(&mut self, dx: f64, dy: f64, shift: bool) {
        self.scrollbar.on_wheel(dx, dy, shift);
    }

    /// Per-frame work: honors a finished filter/sort, then applies the queued scrollbar input.
    ///
    /// Drag and track targets set the offset of their axis, wheel deltas are added on top, and
    /// each touched axis renders once no matter how many events arrived since the last frame.
    pub fn tick<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) -> Frame {
        let mut frame = Frame::default();
        if let Some(view) = self.manager.poll() {
            self.redraw(presenter);
            frame.view = Some(view);
        }
        let (target_x, target_y) = self.scrollbar.take_targets();
        let (dx, dy) = self.scrollbar.take_pending().unwrap_or_default();
        let y = (target_y.is_some() || dy != 0.0).then(|| target_y.unwrap_or(self.offset_y) + dy);
        let x = (target_x.is_some() || dx != 0.0).then(|| target_x.unwrap_or(self.offset_x) + dx);
        frame.scrolled = self.apply_offsets(x, y, presenter);
        frame
    }

    /// Blocks until a pending filter/sort result is honored (or `timeout` elapses) and renders it.
    pub fn wait_for_view<P: Presenter<Handle = H>>(
        &mut self,
        timeout: Duration,
        presenter: &mut P,
    ) -> Option<PublishedView> {
        let view = self.manager.wait(timeout)?;
        self.redraw(presenter);
        Some(view)
    }

    pub fn scroll_by<P: Presenter<Handle = H>>(&mut self, dx: f64, dy: f64, presenter: &mut P) {
        let y = (dy != 0.0).then_some(self.offset_y + dy);
        let x = (dx != 0.0).then_some(self.offset_x + dx);
        self.apply_offsets(x, y, presenter);
    }

    pub fn scroll_to<P: Presenter<Handle = H>>(&mut self, x: f64, y: f64, presenter: &mut P) {
        self.apply_offsets(Some(x), Some(y), presenter);
    }

    /// Starts a thumb drag; `pointer` is the pointer coordinate along `axis`.
    pub fn begin_thumb_drag(&mut self, axis: Axis, pointer: f64) {
        let state = self.state();
        let track = self.track(axis);
        self.scrollbar.begin_thumb_drag(axis, pointer, &state, track);
    }

    /// Centers the thumb of `axis` on `pointer` (relative to the track start) and starts
    /// dragging. The jump is applied by the next [`Grid::tick`].
    pub fn press_track(&mut self, axis: Axis, pointer: f64) {
        let state = self.state();
        let track = self.track(axis);
        let _offset = self.scrollbar.press_track(axis, pointer, &state, track);
        vtrace!(?axis, pointer, offset = _offset, "press_track");
    }

    /// Moves the active thumb drag; the offset is applied by the next [`Grid::tick`]. Returns
    /// `false` if no drag is active.
    pub fn drag_to(&mut self, pointer: f64) -> bool {
        self.scrollbar.drag_to(pointer).is_some()
    }

    pub fn end_drag(&mut self) {
        self.scrollbar.end_drag();
    }

    /// Sets or clears (`None` or `""`) the filter of `column`.
    pub fn set_filter<P: Presenter<Handle = H>>(
        &mut self,
        column: usize,
        query: Option<&str>,
        presenter: &mut P,
    ) -> Result<ViewChange> {
        self.check_column(column)?;
        let change = self.manager.set_filter(column, query);
        self.apply_view_change(change, presenter);
        Ok(change)
    }

    /// Cycles the sort of `column` through none → descending → ascending → none.
    pub fn toggle_sort<P: Presenter<Handle = H>>(
        &mut self,
        column: usize,
        presenter: &mut P,
    ) -> Result<ViewChange> {
        self.check_column(column)?;
        let change = self.manager.toggle_sort(column);
        self.apply_view_change(change, presenter);
        Ok(change)
    }

    /// Replaces the dataset. Every visible row is rewritten.
    pub fn replace_all<P: Presenter<Handle = H>>(
        &mut self,
        rows: Vec<Row>,
        presenter: &mut P,
    ) -> Result<ViewChange> {
        let change = self.manager.replace_all(rows)?;
        // Ids may be reused with different content.
        self.rows.recycle_all();
        self.on_dataset_changed(presenter);
        Ok(change)
    }

    /// Appends rows, e.g. from an `on_reach_bottom` callback.
    pub fn append<P: Presenter<Handle = H>>(
        &mut self,
        rows: Vec<Row>,
        presenter: &mut P,
    ) -> Result<ViewChange> {
        let change = self.manager.append(rows)?;
        if change != ViewChange::Unchanged {
            self.on_dataset_changed(presenter);
        }
        Ok(change)
    }

    /// Applies a new viewport size: clamps offsets, re-renders and refreshes the thumbs.
    pub fn resize<P: Presenter<Handle = H>>(&mut self, width: f64, height: f64, presenter: &mut P) {
        self.options.viewport_width = non_negative(width);
        self.options.viewport_height = non_negative(height);
        let (w, h) = (self.options.viewport_width, self.options.row_height);
        for (_, row) in self.rows.iter() {
            presenter.set_size(&row.handle, w, h);
        }
        for header in &self.headers {
            presenter.set_size(&header.handle, w, h);
        }
        self.set_offset_y(self.offset_y, presenter);
        self.set_offset_x(self.offset_x, presenter);
        self.render_rows(presenter);
        self.render_cells(presenter);
        self.refresh_thumbs(presenter);
    }

    /// Resizes `column`, never below `min_column_width`. Returns the previous width.
    pub fn resize_column<P: Presenter<Handle = H>>(
        &mut self,
        column: usize,
        width: u32,
        presenter: &mut P,
    ) -> Result<u32> {
        let width = width.max(self.options.min_column_width);
        let prev = self.columns.set_width(column, width)?;
        if prev != width {
            vtrace!(column, prev, width, "resize_column");
            self.clamp_offsets(presenter);
            self.render_cells(presenter);
            self.refresh_thumbs(presenter);
        }
        Ok(prev)
    }

    /// Reconciles the data row elements against the visible row window.
    pub fn render_rows<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) -> ReconcileStats {
        let state = self.state();
        self.window.clear();
        self.row_ids.clear();
        for (index, position, row) in self.manager.resolve(state.visible_rows()) {
            self.window.push(WindowRow { index, position });
            self.row_ids.push(row.id);
        }

        let mut ctx = RowFrame {
            presenter,
            manager: &self.manager,
            columns: &self.columns,
            state: &state,
            window: &self.window,
            row_height: self.options.row_height,
            top: self.options.header_height(),
            width: self.options.viewport_width,
        };
        let stats = self.rows.reconcile(&mut ctx, &self.row_ids);
        vtrace!(
            start = state.start_row,
            end = state.end_row,
            kept = stats.kept,
            reused = stats.reused,
            created = stats.created,
            destroyed = stats.destroyed,
            "render_rows"
        );
        stats
    }

    /// Re-renders the cells of every visible row and of the header rows for the current column
    /// window. Rows must have been rendered for the current offsets first.
    pub fn render_cells<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) {
        let state = self.state();
        let row_height = self.options.row_height;
        for (slot, id) in self.row_ids.iter().enumerate() {
            let Some(element) = self.rows.get_mut(id) else {
                vwarn!(row = *id, "row element missing; rows must render before cells");
                continue;
            };
            let Some(row) = self.manager.dataset().get(self.window[slot].position) else {
                continue;
            };
            element.render_cells(
                presenter,
                CellSource::Data(row),
                &self.columns,
                &state,
                row_height,
            );
        }
        self.render_headers(presenter, &state);
    }

    /// Destroys every element the grid created.
    pub fn destroy<P: Presenter<Handle = H>>(mut self, presenter: &mut P) {
        for row in self.rows.drain() {
            row.release(presenter);
        }
        for header in self.headers.drain(..) {
            header.release(presenter);
        }
        presenter.destroy(self.thumbs.x);
        presenter.destroy(self.thumbs.y);
        vdebug!("grid destroyed");
    }

    fn render_headers<P: Presenter<Handle = H>>(&mut self, presenter: &mut P, state: &ViewportState) {
        let config = self.manager.config();
        for header in self.headers.iter_mut() {
            let source = match header.kind {
                CellKind::Filter => CellSource::Filter(config),
                _ => CellSource::Header {
                    labels: &self.labels,
                    config,
                },
            };
            header.render_cells(presenter, source, &self.columns, state, self.options.row_height);
        }
    }

    /// Offsets, then rows, then cells, then thumb sizes.
    fn redraw<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) {
        self.clamp_offsets(presenter);
        self.render_rows(presenter);
        self.render_cells(presenter);
        self.refresh_thumbs(presenter);
    }

    fn apply_view_change<P: Presenter<Handle = H>>(&mut self, change: ViewChange, presenter: &mut P) {
        match change {
            ViewChange::Unchanged => {}
            ViewChange::Natural => {
                vdebug!("view back to natural order");
                self.redraw(presenter);
            }
            ViewChange::Dispatched { version: _version } => {
                vdebug!(version = _version, "waiting for view");
                let state = self.state();
                self.render_headers(presenter, &state);
            }
        }
    }

    fn on_dataset_changed<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) {
        self.set_offset_y(self.offset_y, presenter);
        self.set_offset_x(self.offset_x, presenter);
        self.render_rows(presenter);
        self.refresh_thumbs(presenter);
    }

    fn set_offset_y<P: Presenter<Handle = H>>(&mut self, y: f64, presenter: &mut P) {
        let scrollable = self.state().scrollable_height;
        self.offset_y = clamp_offset(y, scrollable);
        let state = self.state();
        self.translate_thumbs(presenter, &state);

        if reached_bottom(self.offset_y, &state, self.options.data_height()) {
            vdebug!(offset_y = self.offset_y, "reached bottom");
            if let Some(on_reach_bottom) = &self.options.on_reach_bottom {
                on_reach_bottom();
            }
        }
    }

    fn set_offset_x<P: Presenter<Handle = H>>(&mut self, x: f64, presenter: &mut P) {
        let scrollable = self.state().scrollable_width;
        self.offset_x = clamp_offset(x, scrollable);
        let state = self.state();
        self.translate_thumbs(presenter, &state);
    }

    /// Pulls offsets back into `[0, scrollable]`. Returns `true` if they moved.
    fn clamp_offsets<P: Presenter<Handle = H>>(&mut self, presenter: &mut P) -> bool {
        let (x, y) = self.state().clamp_offsets(self.offset_x, self.offset_y);
        if x == self.offset_x && y == self.offset_y {
            return false;
        }
        self.offset_x = x;
        self.offset_y = y;
        let state = self.state();
        self.translate_thumbs(presenter, &state);
        true
    }

    /// Moves the given axes and renders each moved axis once. Returns `true` if any axis moved.
    fn apply_offsets<P: Presenter<Handle = H>>(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        presenter: &mut P,
    ) -> bool {
        if let Some(y) = y {
            self.set_offset_y(y, presenter);
        }
        if let Some(x) = x {
            self.set_offset_x(x, presenter);
        }
        if y.is_some() {
            self.render_rows(presenter);
        }
        if x.is_some() {
            self.render_cells(presenter);
        }
        x.is_some() || y.is_some()
    }

    fn refresh_thumbs<P: Presenter<Handle = H>>(&self, presenter: &mut P) {
        let state = self.state();
        presenter.set_size(&self.thumbs.y, SCROLLBAR_THICKNESS, state.thumb_size_y);
        presenter.set_size(&self.thumbs.x, state.thumb_size_x, SCROLLBAR_THICKNESS);
        self.translate_thumbs(presenter, &state);
    }

    fn translate_thumbs<P: Presenter<Handle = H>>(&self, presenter: &mut P, state: &ViewportState) {
        presenter.set_position(
            &self.thumbs.y,
            Some(self.options.viewport_width - SCROLLBAR_THICKNESS),
            Some(self.options.header_height() + state.thumb_offset_y),
        );
        presenter.set_position(
            &self.thumbs.x,
            Some(state.thumb_offset_x),
            Some(self.options.viewport_height - SCROLLBAR_THICKNESS),
        );
    }

    fn track(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.options.viewport_width,
            Axis::Vertical => self.options.data_height(),
        }
    }

    fn check_column(&self, column: usize) -> Result<()> {
        if column >= self.columns.len() {
            return Err(Error::ColumnOutOfRange {
                index: column,
                count: self.columns.len(),
            });
        }
        Ok(())
    }
}

fn clamp_offset(v: f64, max: f64) -> f64 {
    if v > 0.0 { v.min(max) } else { 0.0 }
}

fn non_negative(v: f64) -> f64 {
    if v > 0.0 { v } else { 0.0 }
}

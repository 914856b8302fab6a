// Example: viewport math plus a filtered and sorted view computed in the background.
use std::time::Duration;

use tablegrid::{
    CellValue, ColumnModel, ElementPool, Recyclable, Row, ViewManager, ViewOptions, ViewportInput,
    ViewportState,
};

/// A stand-in for a UI element: remembers which row it shows and where.
#[derive(Debug)]
struct Line {
    id: u64,
    y: f64,
}

impl Recyclable<Vec<String>> for Line {
    type Id = u64;

    fn create(log: &mut Vec<String>, id: u64, slot: usize) -> Self {
        log.push(format!("create {id}"));
        Self {
            id,
            y: slot as f64 * 32.0,
        }
    }

    fn assign(&mut self, log: &mut Vec<String>, id: u64, slot: usize) {
        log.push(format!("reuse {} -> {id}", self.id));
        self.id = id;
        self.y = slot as f64 * 32.0;
    }

    fn place(&mut self, _log: &mut Vec<String>, slot: usize) {
        self.y = slot as f64 * 32.0;
    }

    fn destroy(self, log: &mut Vec<String>) {
        log.push(format!("destroy {}", self.id));
    }
}

fn main() -> tablegrid::Result<()> {
    let rows: Vec<Row> = (0..200_000u64)
        .map(|i| {
            Row::from_values(
                i,
                [
                    CellValue::from((i % 997) as i64),
                    CellValue::from(format!("item {i}")),
                ],
            )
        })
        .collect();
    let columns = ColumnModel::new(vec![120, 240]);
    let mut manager = ViewManager::with_rows(ViewOptions::default(), rows)?;

    let mut input = ViewportInput {
        offset_x: 0.0,
        offset_y: 123_456.0,
        viewport_width: 320.0,
        viewport_height: 480.0,
        row_height: 32.0,
        row_count: manager.row_count(),
    };
    let state = ViewportState::compute(&input, &columns);
    println!(
        "rows={:?} row_offset={} cells={:?} thumb_y={}@{}",
        state.visible_rows(),
        state.row_offset,
        state.visible_cells(),
        state.thumb_size_y,
        state.thumb_offset_y
    );

    let mut pool: ElementPool<u64, Line> = ElementPool::new();
    let mut log = Vec::new();
    let ids: Vec<u64> = state
        .visible_rows()
        .filter_map(|i| manager.row_at(i))
        .map(|r| r.id)
        .collect();
    let stats = pool.reconcile(&mut log, &ids);
    println!("first pass: {stats:?}");

    let _ = manager.set_filter(1, Some("99"));
    let _ = manager.toggle_sort(0);
    match manager.wait(Duration::from_secs(10)) {
        Some(view) => println!("view v{} in region {} with {} rows", view.version, view.region, view.count),
        None => println!("view not ready"),
    }

    input.row_count = manager.row_count();
    let state = ViewportState::compute(&input, &columns);
    let (_, offset_y) = state.clamp_offsets(input.offset_x, input.offset_y);
    input.offset_y = offset_y;
    let state = ViewportState::compute(&input, &columns);

    let ids: Vec<u64> = state
        .visible_rows()
        .filter_map(|i| manager.row_at(i))
        .map(|r| r.id)
        .collect();
    log.clear();
    let stats = pool.reconcile(&mut log, &ids);
    println!("after filter: offset_y={offset_y} {stats:?}");
    for index in state.visible_rows().take(5) {
        if let Some(row) = manager.row_at(index) {
            let cells: Vec<String> = row.cells.iter().map(|c| c.value.to_string()).collect();
            println!("  {}: {}", index + 1, cells.join(" | "));
        }
    }

    let lowest = pool.iter().map(|(_, line)| line.y).fold(0.0, f64::max);
    println!("lowest element at y={lowest}");

    pool.clear(&mut log);
    println!("pool empty={}", pool.is_empty());
    Ok(())
}

// Example: drive a grid for a few frames against a presenter that only counts commands.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tablegrid::{CellValue, ColumnModel, Row};
use tablegrid_adapter::{Content, ElementKind, Grid, GridOptions, Presenter};

#[derive(Debug, Default)]
struct Counting {
    next: u32,
    live: usize,
    created: usize,
    moved: usize,
    painted: usize,
}

impl Presenter for Counting {
    type Handle = u32;

    fn create(&mut self, _kind: ElementKind, _id: u64, _parent: Option<&u32>) -> u32 {
        self.next += 1;
        self.live += 1;
        self.created += 1;
        self.next
    }

    fn set_position(&mut self, _handle: &u32, _x: Option<f64>, _y: Option<f64>) {
        self.moved += 1;
    }

    fn set_size(&mut self, _handle: &u32, _width: f64, _height: f64) {}

    fn set_content(&mut self, _handle: &u32, _content: Content<'_>) {
        self.painted += 1;
    }

    fn destroy(&mut self, _handle: u32) {
        self.live -= 1;
    }
}

impl Counting {
    fn report(&mut self, label: &str) {
        println!(
            "{label:>12}: live={} created={} moved={} painted={}",
            self.live, self.created, self.moved, self.painted
        );
        self.moved = 0;
        self.painted = 0;
    }
}

fn rows(range: std::ops::Range<u64>) -> Vec<Row> {
    range
        .map(|i| {
            Row::from_values(
                i,
                [
                    CellValue::from(i as i64),
                    CellValue::from(format!("user {}", i % 5000)),
                    CellValue::from((i * 37 % 1000) as f64 / 10.0),
                    CellValue::from(if i % 3 == 0 { "active" } else { "idle" }),
                ],
            )
        })
        .collect()
}

fn main() -> tablegrid::Result<()> {
    let wants_more = Arc::new(AtomicBool::new(false));
    let options = GridOptions::new(640.0, 480.0).with_on_reach_bottom(Some({
        let wants_more = Arc::clone(&wants_more);
        move || wants_more.store(true, Ordering::Relaxed)
    }));

    let mut presenter = Counting::default();
    let labels = ["id", "user", "score", "state"].map(String::from).to_vec();
    let mut grid = Grid::new(
        options,
        ColumnModel::new(vec![80, 240, 120, 160]),
        labels,
        rows(0..100_000),
        &mut presenter,
    )?;
    presenter.report("mount");

    // Several wheel events land between two frames; only one scroll is applied.
    for _ in 0..4 {
        grid.on_wheel(0.0, 120.0, false);
    }
    grid.tick(&mut presenter);
    presenter.report("wheel");

    grid.on_wheel(0.0, 200.0, true);
    grid.tick(&mut presenter);
    presenter.report("shift+wheel");

    let _ = grid.set_filter(3, Some("active"), &mut presenter)?;
    let _ = grid.toggle_sort(2, &mut presenter)?;
    if let Some(view) = grid.wait_for_view(Duration::from_secs(10), &mut presenter) {
        println!("view v{} shows {} rows", view.version, view.count);
    }
    presenter.report("filter+sort");

    let _ = grid.set_filter(3, None, &mut presenter)?;
    let _ = grid.toggle_sort(2, &mut presenter)?;
    let _ = grid.toggle_sort(2, &mut presenter)?;
    presenter.report("clear");

    // Pointer moves are coalesced too; the frame applies the last one.
    grid.begin_thumb_drag(tablegrid::Axis::Vertical, 0.0);
    for pointer in [100.0, 1_000.0, 10_000.0] {
        grid.drag_to(pointer);
    }
    grid.end_drag();
    grid.tick(&mut presenter);
    presenter.report("drag");

    if wants_more.swap(false, Ordering::Relaxed) {
        let _ = grid.append(rows(100_000..110_000), &mut presenter)?;
        println!("appended, now {} rows", grid.manager().row_count());
    }

    grid.resize_column(1, 10, &mut presenter)?;
    presenter.report("resize col");

    grid.destroy(&mut presenter);
    presenter.report("destroy");
    Ok(())
}

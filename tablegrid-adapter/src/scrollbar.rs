use tablegrid::{Axis, ViewportState};

/// Track thickness of both scrollbars, in pixels.
pub const SCROLLBAR_THICKNESS: f64 = 8.0;

/// Below this, the cross-axis wheel delta counts as "no movement" when shift is held.
const SHIFT_CROSS_AXIS: f64 = 5.0;
/// A wheel delta above `LOCK_DOMINANT` on one axis locks to that axis when the other axis moved
/// less than `LOCK_CROSS_AXIS`.
const LOCK_DOMINANT: f64 = 30.0;
const LOCK_CROSS_AXIS: f64 = 15.0;

/// Applies the wheel heuristics to a raw delta.
///
/// - shift with a (mostly) vertical delta scrolls horizontally
/// - a strong vertical delta with little horizontal motion drops the horizontal part
/// - a strong horizontal delta with little vertical motion drops the vertical part
pub fn normalize_wheel(dx: f64, dy: f64, shift: bool) -> (f64, f64) {
    if shift && dy.abs() > 0.0 && dx.abs() < SHIFT_CROSS_AXIS {
        (dy, 0.0)
    } else if dy.abs() > LOCK_DOMINANT && dx.abs() < LOCK_CROSS_AXIS {
        (0.0, dy)
    } else if dx.abs() > LOCK_DOMINANT && dy.abs() < LOCK_CROSS_AXIS {
        (dx, 0.0)
    } else {
        (dx, dy)
    }
}

/// Maps a thumb position to a scroll offset. `travel` is the track length minus the thumb size.
pub fn thumb_to_offset(thumb: f64, travel: f64, scrollable: f64) -> f64 {
    if travel <= 0.0 {
        return 0.0;
    }
    thumb / travel * scrollable
}

/// `(thumb_offset, thumb_size, scrollable)` of one axis.
pub fn axis_geometry(state: &ViewportState, axis: Axis) -> (f64, f64, f64) {
    match axis {
        Axis::Horizontal => (state.thumb_offset_x, state.thumb_size_x, state.scrollable_width),
        Axis::Vertical => (state.thumb_offset_y, state.thumb_size_y, state.scrollable_height),
    }
}

/// `true` when the vertical offset sits at the very bottom of a track that can actually scroll.
pub fn reached_bottom(offset_y: f64, state: &ViewportState, track: f64) -> bool {
    state.thumb_size_y < track && offset_y == state.scrollable_height
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    axis: Axis,
    start_pointer: f64,
    start_thumb: f64,
    travel: f64,
    scrollable: f64,
}

/// Scrollbar input state: wheel deltas and drag targets waiting for the next frame, plus the
/// active thumb drag.
///
/// It never moves anything itself. Once per frame the grid takes what accumulated, recomputes
/// the viewport and repositions the thumbs from the new [`ViewportState`].
#[derive(Clone, Debug, Default)]
pub struct ScrollbarController {
    pending_x: f64,
    pending_y: f64,
    /// Latest absolute offsets requested by drags or track presses.
    target_x: Option<f64>,
    target_y: Option<f64>,
    drag: Option<Drag>,
}

impl ScrollbarController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a wheel event. Applied once per frame via [`Self::take_pending`].
    pub fn on_wheel(&mut self, dx: f64, dy: f64, shift: bool) {
        let (dx, dy) = normalize_wheel(dx, dy, shift);
        self.pending_x += dx;
        self.pending_y += dy;
    }

    /// `true` if wheel deltas or drag targets wait for the next frame.
    pub fn has_pending(&self) -> bool {
        self.pending_x != 0.0
            || self.pending_y != 0.0
            || self.target_x.is_some()
            || self.target_y.is_some()
    }

    /// Returns and resets the accumulated wheel `(dx, dy)`, or `None` if the wheel did not move.
    pub fn take_pending(&mut self) -> Option<(f64, f64)> {
        if self.pending_x == 0.0 && self.pending_y == 0.0 {
            return None;
        }
        let delta = (self.pending_x, self.pending_y);
        self.pending_x = 0.0;
        self.pending_y = 0.0;
        Some(delta)
    }

    /// Returns and clears the latest `(x, y)` drag targets. Only the last target of each axis
    /// since the previous frame survives.
    pub fn take_targets(&mut self) -> (Option<f64>, Option<f64>) {
        (self.target_x.take(), self.target_y.take())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_axis(&self) -> Option<Axis> {
        self.drag.map(|d| d.axis)
    }

    /// Starts dragging the thumb of `axis`. `pointer` is the pointer coordinate along the axis.
    pub fn begin_thumb_drag(&mut self, axis: Axis, pointer: f64, state: &ViewportState, track: f64) {
        let (thumb, size, scrollable) = axis_geometry(state, axis);
        self.drag = Some(Drag {
            axis,
            start_pointer: pointer,
            start_thumb: thumb,
            travel: (track - size).max(0.0),
            scrollable,
        });
    }

    /// Jumps the thumb so its center lands on `pointer` (relative to the track start) and starts
    /// a drag from there. Returns the new scroll offset, which is also queued as the axis target.
    pub fn press_track(&mut self, axis: Axis, pointer: f64, state: &ViewportState, track: f64) -> f64 {
        let (_, size, scrollable) = axis_geometry(state, axis);
        let travel = (track - size).max(0.0);
        let thumb = (pointer - size / 2.0).clamp(0.0, travel);
        self.drag = Some(Drag {
            axis,
            start_pointer: pointer,
            start_thumb: thumb,
            travel,
            scrollable,
        });
        let offset = thumb_to_offset(thumb, travel, scrollable);
        self.set_target(axis, offset);
        offset
    }

    /// Moves the active drag to `pointer` and queues the resulting offset as the axis target.
    /// Returns the axis and that offset.
    pub fn drag_to(&mut self, pointer: f64) -> Option<(Axis, f64)> {
        let drag = self.drag?;
        let thumb = (drag.start_thumb + pointer - drag.start_pointer).clamp(0.0, drag.travel);
        let offset = thumb_to_offset(thumb, drag.travel, drag.scrollable);
        self.set_target(drag.axis, offset);
        Some((drag.axis, offset))
    }

    /// Ends the drag. A target queued by the last move is still applied on the next frame.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    fn set_target(&mut self, axis: Axis, offset: f64) {
        match axis {
            Axis::Horizontal => self.target_x = Some(offset),
            Axis::Vertical => self.target_y = Some(offset),
        }
    }
}

//! Fixed-capacity row-position buffer shared between the interactive context and the
//! background view worker.
//!
//! Layout: two regions of `capacity` slots. Each region carries the version of the computation
//! that last wrote it and the number of valid slots, published with release ordering after the
//! slots are written. The interactive context pins the region it is currently displaying; the
//! worker always writes the other one, so a superseded computation can never overwrite the view
//! on screen.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Default number of row slots per region.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1_000_000;

const NO_VERSION: u64 = 0;

#[derive(Debug)]
struct Region {
    slots: Box<[AtomicU32]>,
    count: AtomicUsize,
    version: AtomicU64,
}

impl Region {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            count: AtomicUsize::new(0),
            version: AtomicU64::new(NO_VERSION),
        }
    }
}

/// A published view: which region holds it, for which version, and how many slots are valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishedView {
    pub version: u64,
    pub region: usize,
    pub count: usize,
}

#[derive(Debug)]
pub struct SharedIndexBuffer {
    regions: [Region; 2],
    capacity: usize,
    /// Latest version dispatched by the interactive context; the worker's cancellation
    /// checkpoints compare against it.
    latest: AtomicU64,
    /// Region currently displayed by the interactive context.
    pinned: AtomicUsize,
}

impl SharedIndexBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            regions: [Region::new(capacity), Region::new(capacity)],
            capacity,
            latest: AtomicU64::new(NO_VERSION),
            pinned: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest_version(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub(crate) fn set_latest_version(&self, version: u64) {
        self.latest.store(version, Ordering::Release);
    }

    /// `true` once a newer computation than `version` has been dispatched.
    pub fn is_superseded(&self, version: u64) -> bool {
        self.latest_version() != version
    }

    pub(crate) fn pin(&self, region: usize) {
        self.pinned.store(region & 1, Ordering::Release);
    }

    /// Region the next computation must write.
    pub(crate) fn write_region(&self) -> usize {
        1 - (self.pinned.load(Ordering::Acquire) & 1)
    }

    /// Writes `positions` into `region` and publishes them for `version`.
    ///
    /// Returns `None` if `positions` does not fit; nothing is published in that case.
    pub(crate) fn write(&self, region: usize, version: u64, positions: &[u32]) -> Option<PublishedView> {
        if positions.len() > self.capacity {
            return None;
        }
        let r = &self.regions[region & 1];
        // Invalidate first so a reader validating the tag never pairs the old tag with new data.
        r.version.store(NO_VERSION, Ordering::Release);
        for (slot, &pos) in r.slots.iter().zip(positions) {
            slot.store(pos, Ordering::Relaxed);
        }
        r.count.store(positions.len(), Ordering::Release);
        r.version.store(version, Ordering::Release);
        Some(PublishedView {
            version,
            region: region & 1,
            count: positions.len(),
        })
    }

    /// Validates a completion against the region's generation tag and returns its published
    /// count.
    pub(crate) fn published(&self, region: usize, version: u64) -> Option<usize> {
        let r = &self.regions[region & 1];
        if r.version.load(Ordering::Acquire) != version {
            return None;
        }
        Some(r.count.load(Ordering::Acquire))
    }

    /// Loads the row position at `index` of a published view.
    ///
    /// Indexes at or past the published count are never read.
    pub fn load(&self, view: &PublishedView, index: usize) -> Option<usize> {
        if index >= view.count {
            return None;
        }
        let slot = self.regions[view.region & 1].slots.get(index)?;
        Some(slot.load(Ordering::Relaxed) as usize)
    }
}

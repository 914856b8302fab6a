use core::hash::Hash;
use std::collections::{HashMap, HashSet};

/// A visual element managed by an [`ElementPool`].
///
/// `C` is the per-pass context (typically the presentation layer plus the frame data needed to
/// resolve `slot` into content and position). Elements never hold a reference back to their
/// owner; everything they need arrives through `ctx`.
pub trait Recyclable<C>: Sized {
    type Id: Copy + Eq + Hash;

    /// Creates a new element for `id`, displayed at window position `slot`.
    fn create(ctx: &mut C, id: Self::Id, slot: usize) -> Self;

    /// Reassigns a recycled element to `id`.
    ///
    /// Implementations must overwrite every mutable field (identity, content, position, size):
    /// the pool gives no guarantee about which element is handed back.
    fn assign(&mut self, ctx: &mut C, id: Self::Id, slot: usize);

    /// Moves an element that stays visible to window position `slot`.
    fn place(&mut self, ctx: &mut C, slot: usize);

    fn destroy(self, ctx: &mut C);
}

/// Statistics of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub kept: usize,
    pub reused: usize,
    pub created: usize,
    pub destroyed: usize,
}

/// Reconciles a bounded set of elements against the currently visible ids.
///
/// A pass costs `O(window)`: the pool only ever holds elements for ids that were visible in the
/// previous pass, so its size is bounded by the viewport capacity, never by the dataset size.
#[derive(Debug)]
pub struct ElementPool<K, E> {
    live: HashMap<K, E>,
    recycle: Vec<E>,
    visible: HashSet<K>,
    released: Vec<K>,
}

impl<K, E> Default for ElementPool<K, E> {
    fn default() -> Self {
        Self {
            live: HashMap::new(),
            recycle: Vec::new(),
            visible: HashSet::new(),
            released: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, E> ElementPool<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.live.contains_key(id)
    }

    pub fn get(&self, id: &K) -> Option<&E> {
        self.live.get(id)
    }

    pub fn get_mut(&mut self, id: &K) -> Option<&mut E> {
        self.live.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &E)> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut E)> {
        self.live.iter_mut()
    }

    /// Moves every live element onto the reuse stack, so the next pass reassigns all of them.
    ///
    /// Used when the content behind unchanged ids may have changed (e.g. a recycled row whose
    /// cells share ids with the previous row's cells).
    pub fn recycle_all(&mut self) {
        self.recycle.extend(self.live.drain().map(|(_, e)| e));
    }

    /// Runs one reconciliation pass for `ids`, in window order.
    ///
    /// Duplicate ids are ignored after their first occurrence.
    pub fn reconcile<C>(&mut self, ctx: &mut C, ids: &[K]) -> ReconcileStats
    where
        E: Recyclable<C, Id = K>,
    {
        let mut stats = ReconcileStats::default();

        // 1) New visible set.
        self.visible.clear();
        self.visible.extend(ids.iter().copied());

        // 2) Elements that left the window go onto the reuse stack.
        self.released.clear();
        self.released.extend(
            self.live
                .keys()
                .filter(|id| !self.visible.contains(id))
                .copied(),
        );
        for id in self.released.drain(..) {
            if let Some(e) = self.live.remove(&id) {
                self.recycle.push(e);
            }
        }

        // 3) Keep, reuse, or create.
        for (slot, &id) in ids.iter().enumerate() {
            if !self.visible.remove(&id) {
                continue;
            }
            if let Some(e) = self.live.get_mut(&id) {
                e.place(ctx, slot);
                stats.kept += 1;
                continue;
            }
            let element = match self.recycle.pop() {
                Some(mut e) => {
                    e.assign(ctx, id, slot);
                    stats.reused += 1;
                    e
                }
                None => {
                    stats.created += 1;
                    E::create(ctx, id, slot)
                }
            };
            self.live.insert(id, element);
        }

        // Whatever was not reused is surplus.
        for e in self.recycle.drain(..) {
            e.destroy(ctx);
            stats.destroyed += 1;
        }

        vtrace!(
            kept = stats.kept,
            reused = stats.reused,
            created = stats.created,
            destroyed = stats.destroyed,
            "ElementPool::reconcile"
        );
        stats
    }

    /// Removes every element without destroying it.
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.live
            .drain()
            .map(|(_, e)| e)
            .chain(self.recycle.drain(..))
    }

    /// Destroys every element.
    pub fn clear<C>(&mut self, ctx: &mut C)
    where
        E: Recyclable<C, Id = K>,
    {
        for e in self.drain() {
            e.destroy(ctx);
        }
    }
}

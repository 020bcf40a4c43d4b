use std::sync::{Mutex, MutexGuard, PoisonError};

use slotmap::SlotMap;
use tracing::trace;

use crate::operations::ClipResult;

slotmap::new_key_type! {
    /// Unique identifier of an intermediate clip result.
    pub struct ScratchId;
}

/// Arena for per-invocation clip results.
///
/// Every insertion gets its own generational key, so concurrent invocations
/// never see each other's buffers. Entries are released when their
/// [`ScratchLease`] drops.
#[derive(Debug, Default)]
pub struct ScratchStore {
    entries: Mutex<SlotMap<ScratchId, ClipResult>>,
}

impl ScratchStore {
    /// Creates a new, empty scratch store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a clip result and returns the lease that owns it.
    pub fn insert(&self, result: ClipResult) -> ScratchLease<'_> {
        let id = self.lock().insert(result);
        trace!(?id, "scratch allocated");
        ScratchLease { store: self, id }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, SlotMap<ScratchId, ClipResult>> {
        // A panic while holding the lock leaves the map itself consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of one scratch entry; dropping it releases the entry.
#[derive(Debug)]
pub struct ScratchLease<'a> {
    store: &'a ScratchStore,
    id: ScratchId,
}

impl ScratchLease<'_> {
    #[must_use]
    pub fn id(&self) -> ScratchId {
        self.id
    }

    /// Runs `f` on the leased clip result.
    pub fn with<R>(&self, f: impl FnOnce(&ClipResult) -> R) -> Option<R> {
        self.store.lock().get(self.id).map(f)
    }
}

impl Drop for ScratchLease<'_> {
    fn drop(&mut self) {
        self.store.lock().remove(self.id);
        trace!(id = ?self.id, "scratch released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polyline, Ring};
    use crate::operations::ClipLines;

    fn clipped() -> ClipResult {
        let ring = Ring::from_coords(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]);
        ClipLines::new(&ring).execute(&[Polyline::from_coords(&[(1.0, 1.0), (3.0, 1.0)])])
    }

    #[test]
    fn lease_releases_on_drop() {
        let store = ScratchStore::new();
        {
            let lease = store.insert(clipped());
            assert_eq!(store.len(), 1);
            let length = lease.with(ClipResult::total_length);
            assert!(matches!(length, Some(l) if (l - 2.0).abs() < 1e-9));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn leases_get_distinct_ids() {
        let store = ScratchStore::new();
        let a = store.insert(ClipResult::default());
        let b = store.insert(ClipResult::default());
        assert_ne!(a.id(), b.id());
        drop(a);
        assert_eq!(store.len(), 1);
        assert!(b.with(ClipResult::is_empty).unwrap_or(false));
    }

    #[test]
    fn lease_releases_during_error_unwind() {
        fn fails(store: &ScratchStore) -> Result<(), String> {
            let _lease = store.insert(ClipResult::default());
            Err("mid-computation failure".into())
        }
        let store = ScratchStore::new();
        assert!(fails(&store).is_err());
        assert!(store.is_empty());
    }
}

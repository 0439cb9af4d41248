use std::sync::Arc;

use parking_lot::RwLock;

use crate::capture::domain::metadata_object::{empty_snapshot, MetadataSnapshot};

/// The current metadata batch, readable from any thread.
///
/// Stores swap the `Arc` under a short write lock and loads clone it, so a
/// reader always holds a whole batch: the one before a store or the one after.
#[derive(Clone)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<MetadataSnapshot>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(empty_snapshot())),
        }
    }

    pub fn load(&self) -> MetadataSnapshot {
        self.inner.read().clone()
    }

    pub fn store(&self, snapshot: MetadataSnapshot) {
        *self.inner.write() = snapshot;
    }
}

impl Default for SharedSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

// src/storage/snapshot.rs

//! Atomically replaced in-memory snapshots.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable result set of one successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    /// `None` only for the cold-start snapshot
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            updated_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Holder of the current snapshot for one content type.
///
/// The lock is only taken to clone or swap the `Arc`; readers keep the
/// snapshot they got even if a newer one is published meanwhile.
#[derive(Debug)]
pub struct SnapshotStore<T> {
    current: RwLock<Arc<Snapshot<T>>>,
}

impl<T> SnapshotStore<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Replace the current snapshot, stamped with the publish time.
    pub fn publish(&self, items: Vec<T>) -> Arc<Snapshot<T>> {
        let snapshot = Arc::new(Snapshot {
            items,
            updated_at: Some(Utc::now()),
        });
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&snapshot);
        snapshot
    }

    pub fn current(&self) -> Arc<Snapshot<T>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl<T> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! In-memory storage of the published result sets.
//!
//! Each content type has one [`SnapshotStore`]. Pipelines publish whole
//! snapshots; HTTP handlers only ever read the current one.

pub mod snapshot;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{Paper, Repository};

pub use snapshot::{Snapshot, SnapshotStore};

/// The stores for both content types, shared between jobs and handlers.
#[derive(Debug, Clone, Default)]
pub struct Snapshots {
    pub repos: Arc<SnapshotStore<Repository>>,
    pub papers: Arc<SnapshotStore<Paper>>,
}

impl Snapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest publish time across both stores.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.repos.current().updated_at.max(self.papers.current().updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_updated_takes_newest() {
        let snapshots = Snapshots::new();
        assert_eq!(snapshots.last_updated(), None);

        snapshots.repos.publish(Vec::new());
        let repos_at = snapshots.repos.current().updated_at;
        assert_eq!(snapshots.last_updated(), repos_at);

        snapshots.papers.publish(Vec::new());
        let papers_at = snapshots.papers.current().updated_at;
        assert_eq!(snapshots.last_updated(), repos_at.max(papers_at));
    }
}

// src/pipeline/scheduler.rs

//! Periodic pipeline jobs.
//!
//! A job is `Idle` or `Running`. Overlapping runs of the same job are
//! rejected rather than queued; the next tick is the only retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::error::{AppError, Result};
use crate::pipeline::collect::Pipeline;
use crate::storage::SnapshotStore;

/// Resets the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A pipeline bound to the store it publishes into.
pub struct PipelineJob<P: Pipeline> {
    pipeline: P,
    store: Arc<SnapshotStore<P::Item>>,
    running: AtomicBool,
}

impl<P: Pipeline> PipelineJob<P> {
    pub fn new(pipeline: P, store: Arc<SnapshotStore<P::Item>>) -> Self {
        Self {
            pipeline,
            store,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the pipeline once and publish a non-empty result.
    ///
    /// Failures and empty results leave the current snapshot in place.
    /// Returns the number of published items.
    pub async fn run_once(&self) -> Result<usize> {
        let kind = self.pipeline.kind();
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::AlreadyRunning(kind.to_string()));
        }
        let _guard = RunGuard(&self.running);

        log::info!("Collecting {}", kind);
        let items = self.pipeline.run().await?;
        if items.is_empty() {
            return Err(AppError::EmptyResult(kind.to_string()));
        }

        let snapshot = self.store.publish(items);
        log::info!("Published {} {}", snapshot.len(), kind);
        Ok(snapshot.len())
    }

    /// Run on a fixed interval, first tick one interval from now.
    pub fn spawn_periodic(self: Arc<Self>, every: Duration) -> JoinHandle<()>
    where
        P: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(error) = self.run_once().await {
                    log::error!("Scheduled {} run failed: {}", self.pipeline.kind(), error);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, Repository};
    use crate::pipeline::collect::tests::{ai_repo, failing, ok, repo_pipeline};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_run_once_publishes() {
        let store = Arc::new(SnapshotStore::new());
        let job = PipelineJob::new(repo_pipeline(vec![ok(vec![ai_repo("a/llm")])]), store.clone());

        assert_eq!(job.run_once().await.unwrap(), 1);
        assert_eq!(store.current().items[0].name, "a/llm");
        assert!(store.current().updated_at.is_some());
        assert!(!job.is_running());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_previous_snapshot() {
        let store = Arc::new(SnapshotStore::new());
        let before = store.publish(vec![ai_repo("a/llm")]);

        let job = PipelineJob::new(repo_pipeline(vec![failing(), failing()]), store.clone());
        let err = job.run_once().await.unwrap_err();
        assert!(matches!(err, AppError::AllSourcesFailed { .. }));

        let after = store.current();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.updated_at, before.updated_at);
        assert!(!job.is_running());
    }

    #[tokio::test]
    async fn test_empty_run_is_not_published() {
        let store = Arc::new(SnapshotStore::new());
        let job = PipelineJob::new(repo_pipeline(vec![ok(Vec::new())]), store.clone());

        let err = job.run_once().await.unwrap_err();
        assert!(matches!(err, AppError::EmptyResult(_)));
        assert!(store.current().updated_at.is_none());
    }

    /// Pipeline that blocks until released, to hold a run open.
    struct Gated {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Pipeline for Gated {
        type Item = Repository;

        fn kind(&self) -> ContentKind {
            ContentKind::Repositories
        }

        async fn run(&self) -> Result<Vec<Repository>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![ai_repo("a/llm")])
        }
    }

    #[tokio::test]
    async fn test_overlapping_run_is_rejected() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let job = Arc::new(PipelineJob::new(
            Gated {
                entered: entered.clone(),
                release: release.clone(),
            },
            Arc::new(SnapshotStore::new()),
        ));

        let first = tokio::spawn({
            let job = job.clone();
            async move { job.run_once().await }
        });
        entered.notified().await;
        assert!(job.is_running());

        let second = job.run_once().await.unwrap_err();
        assert!(matches!(second, AppError::AlreadyRunning(_)));

        release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), 1);
        assert!(!job.is_running());
    }
}

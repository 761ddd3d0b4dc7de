//! Bounded concurrent processing of repositories.

use crate::discovery::Repository;
use crate::summary::RunSummary;
use crate::updater::Updater;
use futures::stream::{self, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs repository updates with at most `workers` in flight.
pub struct WorkerPool {
    workers: usize,
    updater: Arc<Updater>,
}

impl WorkerPool {
    /// Creates a pool. A worker count of zero is treated as one.
    #[must_use]
    pub fn new(workers: usize, updater: Arc<Updater>) -> Self {
        Self {
            workers: workers.max(1),
            updater,
        }
    }

    /// Processes every repository and aggregates the outcomes.
    ///
    /// Once `cancel` fires no further repositories are dispatched; updates
    /// already in flight observe the token and finish as failed. The
    /// summary's `total` is always the number of repositories submitted.
    pub async fn process(&self, repositories: Vec<Repository>, cancel: &CancellationToken) -> RunSummary {
        let mut summary = RunSummary::new(repositories.len(), self.updater.settings().dry_run);
        info!(total = summary.total, workers = self.workers, "Processing repositories");

        let outcomes = stream::iter(repositories)
            .take_until(cancel.cancelled())
            .map(|repository| {
                let updater = Arc::clone(&self.updater);
                let cancel = cancel.clone();
                async move { updater.process(repository, &cancel).await }
            })
            .buffer_unordered(self.workers);
        let mut outcomes = pin!(outcomes);

        while let Some(outcome) = outcomes.next().await {
            if let Some(error) = outcome.error() {
                warn!(repo = %outcome.repository, error, "Repository failed");
            } else if outcome.changed() {
                info!(
                    repo = %outcome.repository,
                    pr = outcome.pull_request.as_ref().map(|pr| pr.url.as_str()),
                    "Repository updated"
                );
            } else {
                info!(repo = %outcome.repository, "No updates needed");
            }
            summary.record(outcome);
        }

        summary.cancelled = cancel.is_cancelled();
        if summary.cancelled {
            warn!(
                processed = summary.outcomes.len(),
                total = summary.total,
                "Run cancelled"
            );
        }
        summary
    }
}

//! Run summary types.

use super::result::UpdateOutcome;
use serde::Serialize;

/// Aggregated results of a run.
///
/// `total` is the number of repositories submitted, even when a run is
/// cancelled before every repository was dispatched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of repositories submitted.
    pub total: usize,

    /// Outcomes that did not fail.
    pub successful: usize,

    /// Successful outcomes that produced changes.
    pub changed: usize,

    /// Outcomes that failed.
    pub failed: usize,

    /// Successful outcomes with nothing to change.
    pub skipped: usize,

    /// Whether the run was cancelled before finishing.
    pub cancelled: bool,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Outcomes in completion order.
    pub outcomes: Vec<UpdateOutcome>,
}

impl RunSummary {
    /// Creates an empty summary for `total` repositories.
    #[must_use]
    pub fn new(total: usize, dry_run: bool) -> Self {
        Self {
            total,
            dry_run,
            ..Default::default()
        }
    }

    /// Counts an outcome and keeps it.
    pub fn record(&mut self, outcome: UpdateOutcome) {
        if outcome.succeeded() {
            self.successful += 1;
            if outcome.changed() {
                self.changed += 1;
            } else {
                self.skipped += 1;
            }
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Returns true if any repository failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if every submitted repository was processed without failure.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failed == 0 && !self.cancelled && self.successful == self.total
    }
}

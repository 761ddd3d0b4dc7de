//! Per-repository update outcomes.

use crate::gateway::PullRequestRef;
use crate::pull_requests::PrAction;
use serde::Serialize;

/// How a repository update ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// No tracked file changed, or there was nothing to commit.
    UpToDate,

    /// Changes were produced but not delivered (dry run).
    Simulated,

    /// Changes were committed and pushed.
    Updated,

    /// A step failed; `error` carries its message.
    Failed { error: String },
}

/// Result of updating a single repository.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    /// Repository full name.
    pub repository: String,

    /// Branch the update targeted.
    pub branch: String,

    /// Changed files, in plugin order.
    pub changed_files: Vec<String>,

    /// Pull request created or refreshed for the update.
    pub pull_request: Option<PullRequestRef>,

    /// Whether the pull request was opened or refreshed.
    pub pull_request_action: Option<PrAction>,

    /// Non-fatal problems, such as labels that could not be applied.
    pub warnings: Vec<String>,

    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl UpdateOutcome {
    /// Creates an up-to-date outcome with nothing recorded yet.
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: String::new(),
            changed_files: Vec::new(),
            pull_request: None,
            pull_request_action: None,
            warnings: Vec::new(),
            status: OutcomeStatus::UpToDate,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(repository: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed {
                error: error.into(),
            },
            ..Self::new(repository)
        }
    }

    /// Returns true unless the update failed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, OutcomeStatus::Failed { .. })
    }

    /// Returns true if the update produced changes.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Simulated | OutcomeStatus::Updated)
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

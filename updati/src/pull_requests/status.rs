//! Pull request reconciliation results.

use crate::gateway::PullRequestRef;
use serde::Serialize;

/// What reconciliation did to the remote pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrAction {
    /// A new pull request was opened.
    Created,

    /// An existing open pull request was refreshed in place.
    Updated,
}

/// Pull request state after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledPullRequest {
    pub pull_request: PullRequestRef,
    pub action: PrAction,

    /// Label failures, which never fail the update.
    pub warnings: Vec<String>,
}

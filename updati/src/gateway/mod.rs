//! Boundary to the repository hosting API.
//!
//! [`RepositoryHost`] is the narrow set of hosting calls the pipeline needs.
//! [`GitHubHost`] implements it against the GitHub REST API; tests supply
//! in-memory hosts.

mod error;
mod github;

pub use error::HostError;
pub use github::GitHubHost;

use crate::discovery::Repository;
use async_trait::async_trait;
use serde::Serialize;

/// Reference to a pull request on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRef {
    /// Pull request number.
    pub number: u64,

    /// Browser URL of the pull request.
    pub url: String,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Pull request title.
    pub title: String,

    /// Pull request body (markdown).
    pub body: String,

    /// Branch holding the changes.
    pub head: String,

    /// Branch the changes should merge into.
    pub base: String,
}

/// Hosting API operations used by discovery and pull request reconciliation.
///
/// Every call must be safe to repeat with identical arguments.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Lists all repositories owned by `owner`, following pagination.
    ///
    /// `owner` may be a user or an organization.
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError>;

    /// Fetches a file from the repository's default branch.
    ///
    /// Returns `None` if the file does not exist.
    async fn file_content(
        &self,
        repository: &Repository,
        path: &str,
    ) -> Result<Option<String>, HostError>;

    /// Finds an open pull request from `head` into `base`.
    async fn find_open_pull_request(
        &self,
        repository: &Repository,
        head: &str,
        base: &str,
    ) -> Result<Option<PullRequestRef>, HostError>;

    /// Opens a new pull request.
    async fn create_pull_request(
        &self,
        repository: &Repository,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostError>;

    /// Replaces the title and body of an existing pull request.
    async fn update_pull_request(
        &self,
        repository: &Repository,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef, HostError>;

    /// Adds labels to a pull request.
    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError>;
}

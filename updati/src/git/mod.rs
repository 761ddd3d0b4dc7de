//! Version-control operations on a working copy.

mod cli;
mod error;

pub use cli::{authenticated_url, GitCli};
pub use error::GitError;

use crate::discovery::Repository;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Result of staging and committing a working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// A commit was created.
    Committed,

    /// Staging produced no diff; nothing was committed.
    NothingToCommit,
}

/// How a branch is published to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// Replace the remote branch, discarding commits that are not in `HEAD`.
    Force,

    /// Only advance the remote branch; a diverged branch is rejected.
    FastForward,
}

/// Version-control operations the update pipeline performs.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Clones `branch` of the repository into `destination`.
    ///
    /// `destination` exists and is empty.
    async fn clone_repository(
        &self,
        repository: &Repository,
        branch: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), GitError>;

    /// Creates `branch` at the current checkout, overwriting any existing
    /// local branch of that name.
    async fn checkout_branch(
        &self,
        working_dir: &Path,
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<(), GitError>;

    /// Stages every change and commits it with `message`.
    async fn commit_all(
        &self,
        working_dir: &Path,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitStatus, GitError>;

    /// Pushes `HEAD` to `branch` on the remote.
    async fn push(
        &self,
        working_dir: &Path,
        branch: &str,
        mode: PushMode,
        cancel: &CancellationToken,
    ) -> Result<(), GitError>;
}

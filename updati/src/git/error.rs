//! Git error types.

use thiserror::Error;

/// Errors that can occur during git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Clone URL could not be parsed.
    #[error("Invalid clone URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Clone failed.
    #[error("Failed to clone repository: {message}")]
    CloneFailed { message: String },

    /// Branch creation failed.
    #[error("Failed to create branch '{branch}': {message}")]
    BranchFailed { branch: String, message: String },

    /// Staging or committing failed.
    #[error("Failed to commit changes: {message}")]
    CommitFailed { message: String },

    /// Push failed.
    #[error("Failed to push changes: {message}")]
    PushFailed { message: String },

    /// The operation was cancelled.
    #[error("Git operation cancelled")]
    Cancelled,
}

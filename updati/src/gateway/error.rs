//! Hosting API error types.

use thiserror::Error;

/// Errors returned by a [`RepositoryHost`](super::RepositoryHost).
#[derive(Debug, Error)]
pub enum HostError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The host rejected the request.
    #[error("Request rejected: {message}")]
    Rejected { message: String },
}

impl HostError {
    /// Returns true if the error is an HTTP 404 from the host.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::GitHubError(octocrab::Error::GitHub { source, .. }) => {
                source.status_code.as_u16() == 404
            }
            _ => false,
        }
    }
}

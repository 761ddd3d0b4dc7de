//! Update error types.

use crate::discovery::DiscoveryError;
use crate::gateway::HostError;
use crate::git::GitError;
use crate::plugins::PluginError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that end a repository update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The temporary working copy could not be created.
    #[error("Failed to create working copy: {0}")]
    WorkingCopy(#[source] std::io::Error),

    /// Manifest detection failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A git step failed.
    #[error(transparent)]
    Git(GitError),

    /// A plugin's update command failed.
    #[error("{plugin}: {source}")]
    Plugin {
        plugin: &'static str,
        #[source]
        source: PluginError,
    },

    /// A commit message or pull request template failed to render.
    #[error("Failed to render {template}: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: TemplateError,
    },

    /// The pull request could not be created or updated.
    #[error("Failed to reconcile pull request: {0}")]
    PullRequest(#[source] HostError),

    /// The run was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<GitError> for UpdateError {
    fn from(error: GitError) -> Self {
        match error {
            GitError::Cancelled => Self::Cancelled,
            other => Self::Git(other),
        }
    }
}

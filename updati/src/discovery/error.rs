//! Discovery error types.

use crate::gateway::HostError;
use thiserror::Error;

/// Errors that can occur during repository discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The account's repositories could not be listed.
    #[error("Failed to list repositories for '{owner}': {source}")]
    ListFailed {
        owner: String,
        #[source]
        source: HostError,
    },

    /// Manifest detection failed for a repository.
    #[error("Failed to check repository {repository}: {source}")]
    DetectionFailed {
        repository: String,
        #[source]
        source: HostError,
    },
}

//! Plugin error types.

use crate::process::ProcessError;
use thiserror::Error;

/// Errors that can occur while running a dependency update.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A tracked file could not be read.
    #[error("Failed to fingerprint {path}: {source}")]
    Fingerprint {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The update command failed, was cancelled, or could not be started.
    #[error(transparent)]
    Command(#[from] ProcessError),
}

impl PluginError {
    /// Returns true if the update was interrupted by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Command(ProcessError::Cancelled { .. }))
    }
}

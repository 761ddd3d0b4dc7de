//! Runner error types.

/// Errors that abort a run before or during discovery.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// No GitHub token was supplied.
    #[error("A GitHub token is required (set GITHUB_TOKEN or pass --token)")]
    MissingToken,

    /// Invalid settings.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Host(#[from] crate::gateway::HostError),

    /// Repository listing errors.
    #[error(transparent)]
    Discovery(#[from] crate::discovery::DiscoveryError),
}

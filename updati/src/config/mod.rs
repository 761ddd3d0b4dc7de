//! Run settings.
//!
//! Settings come from an optional TOML file, then `UPDATI_*` and GitHub
//! Actions `INPUT_*` environment variables, then command-line flags.

mod error;
mod patterns;
mod settings;

pub use error::ConfigError;
pub use patterns::RepoFilter;
pub use settings::{
    ComposerSettings, DeliveryMode, GitAuthor, NpmSettings, Settings, MAX_WORKERS,
};

/// Reads the GitHub token from `GITHUB_TOKEN` or `INPUT_GITHUB_TOKEN`.
///
/// `INPUT_GITHUB_TOKEN` wins when both are set. Empty values are ignored.
#[must_use]
pub fn resolve_token() -> Option<String> {
    ["GITHUB_TOKEN", "INPUT_GITHUB_TOKEN"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .filter(|token| !token.trim().is_empty())
        .last()
}

//! Repository descriptor.

use serde::Serialize;

/// A repository selected for dependency updates.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Repository {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// HTTPS clone URL, without credentials.
    pub clone_url: String,

    /// Default branch name (e.g., "main").
    pub default_branch: String,

    /// Whether `composer.json` exists on the default branch.
    pub has_composer: bool,

    /// Whether `package.json` exists on the default branch.
    pub has_npm: bool,

    /// Whether `composer.json` requires `laravel/framework`.
    pub is_laravel: bool,
}

impl Repository {
    /// Creates a descriptor with no detected capabilities.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        clone_url: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{owner}/{name}"),
            owner,
            name,
            clone_url: clone_url.into(),
            default_branch: default_branch.into(),
            has_composer: false,
            has_npm: false,
            is_laravel: false,
        }
    }

    /// Returns true if any supported manifest was detected.
    #[must_use]
    pub fn has_any_manifest(&self) -> bool {
        self.has_composer || self.has_npm
    }
}

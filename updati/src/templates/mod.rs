//! Template rendering using Handlebars.
//!
//! Commit messages, pull request titles and pull request bodies are
//! Handlebars templates rendered against an [`UpdateContext`].

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

use crate::discovery::Repository;
use serde::Serialize;

/// Variables available to commit message and pull request templates.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateContext {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repository: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Branch the update is pushed to.
    pub branch: String,

    /// Branch a pull request targets (the repository's default branch).
    pub base_branch: String,

    /// Files rewritten by the update, in plugin order.
    pub changed_files: Vec<String>,

    /// Names of the dependency managers that produced changes.
    pub managers: Vec<String>,

    /// Delivery mode: "pull-request" or "direct-push".
    pub mode: &'static str,
}

impl UpdateContext {
    /// Builds a context for a repository update.
    pub fn new(
        repository: &Repository,
        branch: &str,
        changed_files: &[String],
        managers: &[String],
        mode: &'static str,
    ) -> Self {
        Self {
            owner: repository.owner.clone(),
            repository: repository.name.clone(),
            full_name: repository.full_name.clone(),
            branch: branch.to_string(),
            base_branch: repository.default_branch.clone(),
            changed_files: changed_files.to_vec(),
            managers: managers.to_vec(),
            mode,
        }
    }

    /// A representative context used to validate templates ahead of a run.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            owner: "octo-org".to_string(),
            repository: "octo-repo".to_string(),
            full_name: "octo-org/octo-repo".to_string(),
            branch: "updati/dependencies".to_string(),
            base_branch: "main".to_string(),
            changed_files: vec!["composer.lock".to_string()],
            managers: vec!["composer".to_string()],
            mode: "pull-request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_context_from_repository() {
        let repo = Repository::new("acme", "shop", "https://github.com/acme/shop.git", "develop");
        let ctx = UpdateContext::new(
            &repo,
            "updati/dependencies",
            &["composer.lock".to_string()],
            &["composer".to_string()],
            "pull-request",
        );

        assert_eq!(ctx.full_name, "acme/shop");
        assert_eq!(ctx.base_branch, "develop");
        assert_eq!(ctx.changed_files, vec!["composer.lock"]);
    }
}

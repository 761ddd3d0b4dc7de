//! Repository discovery.
//!
//! Lists an account's repositories, keeps those whose names match the
//! configured patterns, and detects which dependency manifests each one
//! carries on its default branch.

mod error;
mod repository;

pub use error::DiscoveryError;
pub use repository::Repository;

use crate::config::RepoFilter;
use crate::gateway::RepositoryHost;
use tracing::{debug, info, info_span, Instrument};

const COMPOSER_MANIFEST: &str = "composer.json";
const NPM_MANIFEST: &str = "package.json";
const LARAVEL_PACKAGE: &str = "laravel/framework";

/// Lists `owner`'s repositories and keeps those matching `filter`.
///
/// # Errors
///
/// Returns [`DiscoveryError::ListFailed`] if the listing fails.
pub async fn discover_repositories(
    host: &dyn RepositoryHost,
    owner: &str,
    filter: &RepoFilter,
) -> Result<Vec<Repository>, DiscoveryError> {
    let span = info_span!("discover", owner = %owner);

    async {
        info!("Fetching repositories");

        let repositories = host
            .list_repositories(owner)
            .await
            .map_err(|source| DiscoveryError::ListFailed {
                owner: owner.to_string(),
                source,
            })?;
        let found = repositories.len();

        let matched: Vec<Repository> = repositories
            .into_iter()
            .filter(|repo| filter.matches(&repo.name))
            .collect();

        info!(found, matched = matched.len(), "Discovery complete");
        Ok(matched)
    }
    .instrument(span)
    .await
}

/// Sets the manifest flags on `repository` from its default branch.
///
/// # Errors
///
/// Returns [`DiscoveryError::DetectionFailed`] if a manifest lookup fails
/// for any reason other than the file being absent.
pub async fn detect_capabilities(
    host: &dyn RepositoryHost,
    repository: &mut Repository,
) -> Result<(), DiscoveryError> {
    let (composer, npm) = futures::try_join!(
        host.file_content(repository, COMPOSER_MANIFEST),
        host.file_content(repository, NPM_MANIFEST),
    )
    .map_err(|source| DiscoveryError::DetectionFailed {
        repository: repository.full_name.clone(),
        source,
    })?;

    repository.has_composer = composer.is_some();
    repository.is_laravel = composer.is_some_and(|content| content.contains(LARAVEL_PACKAGE));
    repository.has_npm = npm.is_some();

    debug!(
        repo = %repository.full_name,
        composer = repository.has_composer,
        npm = repository.has_npm,
        laravel = repository.is_laravel,
        "Detected manifests"
    );
    Ok(())
}

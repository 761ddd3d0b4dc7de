//! Composer (PHP) plugin.

use super::{run_tracked, Ecosystem, Plugin, PluginError, PluginUpdate};
use crate::config::ComposerSettings;
use crate::discovery::Repository;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const LOCKFILE: &str = "composer.lock";
const MANIFEST: &str = "composer.json";

/// Runs `composer update` under a PHP runtime chosen from the manifest.
#[derive(Debug, Clone)]
pub struct ComposerPlugin {
    settings: ComposerSettings,
}

impl ComposerPlugin {
    #[must_use]
    pub fn new(settings: ComposerSettings) -> Self {
        Self { settings }
    }

    /// Picks the PHP runtime for the manifest in `working_dir`.
    async fn php_runtime(&self, working_dir: &Path) -> &Path {
        let constraint = tokio::fs::read_to_string(working_dir.join(MANIFEST))
            .await
            .ok()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .and_then(|manifest| manifest["require"]["php"].as_str().map(str::to_string));

        match constraint {
            Some(constraint) => select_php_runtime(&constraint, &self.settings),
            None => &self.settings.default_php,
        }
    }
}

#[async_trait]
impl Plugin for ComposerPlugin {
    fn name(&self) -> &'static str {
        "composer"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    fn detect(&self, repository: &Repository) -> bool {
        repository.has_composer
    }

    async fn update(
        &self,
        working_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PluginUpdate, PluginError> {
        let php = self.php_runtime(working_dir).await;
        debug!(php = %php.display(), "Selected PHP runtime");

        let mut command = Command::new(php);
        command
            .arg(&self.settings.binary)
            .args([
                "update",
                "--no-interaction",
                "--no-scripts",
                "--no-plugins",
                "--prefer-dist",
                "--ignore-platform-reqs",
            ])
            .env("COMPOSER_NO_INTERACTION", "1");

        run_tracked(working_dir, &[LOCKFILE], command, "composer update", cancel).await
    }
}

/// Selects the runtime for a `require.php` constraint.
///
/// Returns the highest configured version that appears in `constraint`
/// as a whole version (so `8.2` does not match `8.20`) and is not excluded
/// by a `<` or `!=` operator, falling back to the default runtime.
pub fn select_php_runtime<'a>(constraint: &str, settings: &'a ComposerSettings) -> &'a Path {
    settings
        .php_runtimes
        .iter()
        .filter(|(version, _)| allows_version(constraint, version))
        .max_by_key(|(version, _)| version_key(version))
        .map_or(settings.default_php.as_path(), |(_, binary)| binary.as_path())
}

fn allows_version(constraint: &str, version: &str) -> bool {
    constraint.match_indices(version).any(|(start, _)| {
        let before = constraint[..start].chars().next_back();
        let after = constraint[start + version.len()..].chars().next();
        let whole = !before.is_some_and(|c| c.is_ascii_digit() || c == '.')
            && !after.is_some_and(|c| c.is_ascii_digit());

        // `<8.4` and `!=8.4` name a version only to exclude it.
        let operator = constraint[..start].trim_end();
        let excluded = operator.ends_with('<') || operator.ends_with("!=");

        whole && !excluded
    })
}

/// Orders "major.minor" numerically rather than lexically.
fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

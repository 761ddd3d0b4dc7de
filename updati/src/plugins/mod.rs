//! Dependency-manager plugins.
//!
//! A plugin decides from a repository's capability flags whether it
//! applies, then runs its manager's update command inside a working copy
//! and reports which tracked files changed.

mod composer;
mod error;
mod npm;

pub use composer::{select_php_runtime, ComposerPlugin};
pub use error::PluginError;
pub use npm::NpmPlugin;

use crate::config::Settings;
use crate::discovery::Repository;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::process;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Package ecosystems with a built-in plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Composer,
    Npm,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composer => write!(f, "composer"),
            Self::Npm => write!(f, "npm"),
        }
    }
}

/// Result of running a plugin's update command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginUpdate {
    /// True if any tracked file differs from before the update.
    pub changed: bool,

    /// Tracked files that differ, relative to the working copy root.
    pub changed_files: Vec<String>,
}

/// A dependency manager that can update a working copy.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Short name used in logs and templates.
    fn name(&self) -> &'static str;

    /// Ecosystem this plugin updates.
    fn ecosystem(&self) -> Ecosystem;

    /// Returns true if the plugin applies to `repository`.
    fn detect(&self, repository: &Repository) -> bool;

    /// Runs the update inside `working_dir`.
    async fn update(
        &self,
        working_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PluginUpdate, PluginError>;
}

/// Ordered collection of plugins. Registration order is execution order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Composer plugin followed by the npm plugin.
    #[must_use]
    pub fn with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ComposerPlugin::new(settings.composer.clone())));
        registry.register(Arc::new(NpmPlugin::new(settings.npm.clone())));
        registry
    }

    /// Appends a plugin.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Returns the plugins in registration order.
    #[must_use]
    pub fn all(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

/// Runs `command` in `working_dir` and reports which `tracked` files changed.
pub(crate) async fn run_tracked(
    working_dir: &Path,
    tracked: &[&str],
    mut command: Command,
    label: &str,
    cancel: &CancellationToken,
) -> Result<PluginUpdate, PluginError> {
    let before = fingerprint_all(working_dir, tracked).await?;

    command.current_dir(working_dir);
    process::run(command, label, cancel).await?;

    let after = fingerprint_all(working_dir, tracked).await?;
    let changed_files: Vec<String> = tracked
        .iter()
        .zip(before.iter().zip(&after))
        .filter(|(_, (old, new))| old != new)
        .map(|(path, _)| (*path).to_string())
        .collect();

    debug!(command = label, changed = ?changed_files, "Update finished");
    Ok(PluginUpdate {
        changed: !changed_files.is_empty(),
        changed_files,
    })
}

async fn fingerprint_all(
    working_dir: &Path,
    tracked: &[&str],
) -> Result<Vec<Fingerprint>, PluginError> {
    let mut fingerprints = Vec::with_capacity(tracked.len());
    for path in tracked {
        let fp = fingerprint(&working_dir.join(path))
            .await
            .map_err(|source| PluginError::Fingerprint {
                path: (*path).to_string(),
                source,
            })?;
        fingerprints.push(fp);
    }
    Ok(fingerprints)
}

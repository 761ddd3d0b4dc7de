//! npm plugin.

use super::{run_tracked, Ecosystem, Plugin, PluginError, PluginUpdate};
use crate::config::NpmSettings;
use crate::discovery::Repository;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// `npm update` may rewrite version ranges in the manifest as well as the lockfile.
const TRACKED: [&str; 2] = ["package-lock.json", "package.json"];

/// Runs `npm update` with lifecycle scripts disabled.
#[derive(Debug, Clone)]
pub struct NpmPlugin {
    settings: NpmSettings,
}

impl NpmPlugin {
    #[must_use]
    pub fn new(settings: NpmSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Plugin for NpmPlugin {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn detect(&self, repository: &Repository) -> bool {
        repository.has_npm
    }

    async fn update(
        &self,
        working_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PluginUpdate, PluginError> {
        let mut command = Command::new(&self.settings.binary);
        command
            .args(["update", "--no-audit", "--no-fund", "--ignore-scripts"])
            .env("npm_config_engine_strict", "false")
            .env("npm_config_yes", "true");

        run_tracked(working_dir, &TRACKED, command, "npm update", cancel).await
    }
}

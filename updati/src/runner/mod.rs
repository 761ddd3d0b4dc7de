//! Orchestrates a full update run.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::discovery::discover_repositories;
use crate::gateway::{GitHubHost, RepositoryHost};
use crate::git::{GitCli, Vcs};
use crate::plugins::PluginRegistry;
use crate::pool::WorkerPool;
use crate::summary::RunSummary;
use crate::updater::Updater;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Discovers repositories and updates them through a worker pool.
pub struct Runner {
    config: RunnerConfig,
    host: Arc<dyn RepositoryHost>,
    vcs: Arc<dyn Vcs>,
    plugins: Arc<PluginRegistry>,
}

impl Runner {
    /// Builds a runner backed by GitHub, the git CLI and the default plugins.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be constructed.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let settings = config.settings();
        let host = GitHubHost::new(config.token())?;
        let vcs = GitCli::new(Some(config.token().to_string()), settings.git_author.clone())
            .with_shallow_clone(settings.shallow_clone);
        let plugins = PluginRegistry::with_defaults(settings);

        Ok(Self::with_components(
            config,
            Arc::new(host),
            Arc::new(vcs),
            plugins,
        ))
    }

    /// Builds a runner from explicit components.
    #[must_use]
    pub fn with_components(
        config: RunnerConfig,
        host: Arc<dyn RepositoryHost>,
        vcs: Arc<dyn Vcs>,
        plugins: PluginRegistry,
    ) -> Self {
        Self {
            config,
            host,
            vcs,
            plugins: Arc::new(plugins),
        }
    }

    /// Executes the full run.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository listing fails. Per-repository
    /// failures are reported in the summary instead.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, RunnerError> {
        let settings = self.config.settings();
        let mode = if self.config.dry_run() {
            "dry-run"
        } else {
            settings.delivery_mode().as_str()
        };
        info!(
            owner = %settings.owner,
            workers = self.config.workers(),
            mode,
            patterns = ?settings.repo_patterns,
            "Starting run"
        );

        let filter = settings.repo_filter()?;
        let repositories = discover_repositories(self.host.as_ref(), &settings.owner, &filter).await?;

        if repositories.is_empty() {
            warn!("No repositories to process");
            return Ok(RunSummary::new(0, self.config.dry_run()));
        }

        let updater = Updater::new(
            Arc::new(settings.clone()),
            Arc::clone(&self.plugins),
            Arc::clone(&self.host),
            Arc::clone(&self.vcs),
        );
        let pool = WorkerPool::new(self.config.workers(), Arc::new(updater));

        Ok(pool.process(repositories, cancel).await)
    }
}

//! Per-repository update pipeline.
//!
//! [`Updater::update`] clones a repository into a [`WorkingCopy`], runs the
//! applicable plugins, and delivers any changes. In pull request mode the
//! bot branch is rebuilt from the default branch, force-pushed, and a pull
//! request reconciled. In direct-push mode the target branch itself is
//! cloned and only fast-forwarded. Every step aborts the rest on failure
//! and the working copy is removed on every exit path.

mod error;
mod working_copy;

pub use error::UpdateError;
pub use working_copy::WorkingCopy;

use crate::config::{DeliveryMode, Settings};
use crate::discovery::{detect_capabilities, Repository};
use crate::gateway::{NewPullRequest, RepositoryHost};
use crate::git::{CommitStatus, PushMode, Vcs};
use crate::plugins::PluginRegistry;
use crate::pull_requests::reconcile_pull_request;
use crate::summary::{OutcomeStatus, UpdateOutcome};
use crate::templates::{TemplateRenderer, UpdateContext};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

/// Changes produced by the plugins that ran against a working copy.
#[derive(Debug, Default)]
struct PluginChanges {
    changed: bool,
    files: Vec<String>,
    managers: Vec<String>,
}

/// Runs the update pipeline for one repository at a time.
///
/// An `Updater` holds only shared, read-only state and is reused by every
/// worker of a pool.
pub struct Updater {
    settings: Arc<Settings>,
    plugins: Arc<PluginRegistry>,
    host: Arc<dyn RepositoryHost>,
    vcs: Arc<dyn Vcs>,
    renderer: TemplateRenderer,
}

impl Updater {
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        plugins: Arc<PluginRegistry>,
        host: Arc<dyn RepositoryHost>,
        vcs: Arc<dyn Vcs>,
    ) -> Self {
        Self {
            settings,
            plugins,
            host,
            vcs,
            renderer: TemplateRenderer::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Detects manifests, applies the Laravel filter, then updates.
    ///
    /// Detection failures produce a failed outcome. Repositories without a
    /// supported manifest, or excluded by `laravel-only`, are reported up to
    /// date without being cloned.
    pub async fn process(
        &self,
        mut repository: Repository,
        cancel: &CancellationToken,
    ) -> UpdateOutcome {
        if cancel.is_cancelled() {
            return UpdateOutcome::failed(&repository.full_name, UpdateError::Cancelled.to_string());
        }

        if let Err(e) = detect_capabilities(self.host.as_ref(), &mut repository).await {
            error!(repo = %repository.full_name, error = %e, "Manifest detection failed");
            return UpdateOutcome::failed(&repository.full_name, e.to_string());
        }

        let skip_reason = if !repository.has_any_manifest() {
            Some("no supported manifest")
        } else if self.settings.laravel_only && !repository.is_laravel {
            Some("not a Laravel project")
        } else {
            None
        };
        if let Some(reason) = skip_reason {
            info!(repo = %repository.full_name, reason, "Skipping repository");
            return UpdateOutcome {
                branch: self.target_branch(&repository),
                ..UpdateOutcome::new(&repository.full_name)
            };
        }

        self.update(&repository, cancel).await
    }

    /// Updates a repository whose manifest flags are already set.
    pub async fn update(&self, repository: &Repository, cancel: &CancellationToken) -> UpdateOutcome {
        let span = info_span!("update", repo = %repository.full_name);

        async {
            let mut outcome = UpdateOutcome::new(&repository.full_name);
            outcome.branch = self.target_branch(repository);

            match self.run_pipeline(repository, &mut outcome, cancel).await {
                Ok(status) => {
                    info!(status = ?status, files = ?outcome.changed_files, "Update finished");
                    outcome.status = status;
                }
                Err(e) => {
                    error!(error = %e, "Update failed");
                    outcome.status = OutcomeStatus::Failed {
                        error: e.to_string(),
                    };
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Branch the update is pushed to.
    #[must_use]
    pub fn target_branch(&self, repository: &Repository) -> String {
        match self.settings.delivery_mode() {
            DeliveryMode::PullRequest => self.settings.pr_branch.clone(),
            DeliveryMode::DirectPush => self
                .settings
                .base_branch
                .clone()
                .unwrap_or_else(|| repository.default_branch.clone()),
        }
    }

    async fn run_pipeline(
        &self,
        repository: &Repository,
        outcome: &mut UpdateOutcome,
        cancel: &CancellationToken,
    ) -> Result<OutcomeStatus, UpdateError> {
        checkpoint(cancel)?;
        let working_copy = WorkingCopy::create(&repository.name).map_err(UpdateError::WorkingCopy)?;
        debug!(path = %working_copy.path().display(), "Created working copy");

        let result = self
            .update_working_copy(repository, working_copy.path(), outcome, cancel)
            .await;

        working_copy.release();
        result
    }

    async fn update_working_copy(
        &self,
        repository: &Repository,
        dir: &Path,
        outcome: &mut UpdateOutcome,
        cancel: &CancellationToken,
    ) -> Result<OutcomeStatus, UpdateError> {
        let settings = &self.settings;
        let mode = settings.delivery_mode();
        let branch = outcome.branch.clone();

        let (source_branch, push_mode) = match mode {
            DeliveryMode::PullRequest => (repository.default_branch.as_str(), PushMode::Force),
            DeliveryMode::DirectPush => (branch.as_str(), PushMode::FastForward),
        };
        self.vcs
            .clone_repository(repository, source_branch, dir, cancel)
            .await?;

        if mode == DeliveryMode::PullRequest && !settings.dry_run {
            checkpoint(cancel)?;
            self.vcs.checkout_branch(dir, &branch, cancel).await?;
        }

        let changes = self.run_plugins(repository, dir, cancel).await?;
        outcome.changed_files = changes.files.clone();

        if !changes.changed {
            info!("No dependency changes");
            return Ok(OutcomeStatus::UpToDate);
        }

        if settings.dry_run {
            info!(files = ?changes.files, "Dry run, not committing");
            return Ok(OutcomeStatus::Simulated);
        }

        let context = UpdateContext::new(
            repository,
            &branch,
            &changes.files,
            &changes.managers,
            mode.as_str(),
        );
        let message = self.render("commit message", &settings.commit_message, &context)?;

        checkpoint(cancel)?;
        if self.vcs.commit_all(dir, &message, cancel).await? == CommitStatus::NothingToCommit {
            info!("Nothing to commit");
            return Ok(OutcomeStatus::UpToDate);
        }

        checkpoint(cancel)?;
        self.vcs.push(dir, &branch, push_mode, cancel).await?;
        info!(branch = %branch, "Pushed changes");

        if mode == DeliveryMode::PullRequest {
            checkpoint(cancel)?;
            let request = NewPullRequest {
                title: self.render("pull request title", &settings.pr_title, &context)?,
                body: self.render("pull request body", &settings.pr_body, &context)?,
                head: branch,
                base: repository.default_branch.clone(),
            };

            let reconciled =
                reconcile_pull_request(self.host.as_ref(), repository, &request, &settings.labels)
                    .await
                    .map_err(UpdateError::PullRequest)?;

            outcome.pull_request = Some(reconciled.pull_request);
            outcome.pull_request_action = Some(reconciled.action);
            outcome.warnings.extend(reconciled.warnings);
        }

        Ok(OutcomeStatus::Updated)
    }

    /// Runs every enabled, applicable plugin in registry order.
    async fn run_plugins(
        &self,
        repository: &Repository,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PluginChanges, UpdateError> {
        let mut changes = PluginChanges::default();

        for plugin in self.plugins.all() {
            if !self.settings.is_enabled(plugin.ecosystem()) || !plugin.detect(repository) {
                continue;
            }

            checkpoint(cancel)?;
            debug!(plugin = plugin.name(), "Running plugin");

            let update = plugin.update(dir, cancel).await.map_err(|source| {
                if source.is_cancelled() {
                    UpdateError::Cancelled
                } else {
                    UpdateError::Plugin {
                        plugin: plugin.name(),
                        source,
                    }
                }
            })?;

            if update.changed {
                changes.changed = true;
                changes.files.extend(update.changed_files);
                changes.managers.push(plugin.name().to_string());
            }
        }

        Ok(changes)
    }

    fn render(
        &self,
        template_name: &'static str,
        template: &str,
        context: &UpdateContext,
    ) -> Result<String, UpdateError> {
        self.renderer
            .render(template, context)
            .map_err(|source| UpdateError::Template {
                template: template_name,
                source,
            })
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), UpdateError> {
    if cancel.is_cancelled() {
        Err(UpdateError::Cancelled)
    } else {
        Ok(())
    }
}

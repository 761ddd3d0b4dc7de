//! Runner configuration.

use super::RunnerError;
use crate::config::Settings;

/// Validated configuration for a run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Settings after file, environment and flag overrides.
    settings: Settings,
    /// GitHub token used for API calls and git pushes.
    token: String,
}

impl RunnerConfig {
    /// Validates `settings` and pairs them with a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or a setting is invalid.
    pub fn new(settings: Settings, token: String) -> Result<Self, RunnerError> {
        if token.trim().is_empty() {
            return Err(RunnerError::MissingToken);
        }
        settings.validate()?;
        Ok(Self { settings, token })
    }

    /// Returns the run settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.settings.dry_run
    }

    /// Returns the maximum number of concurrent updates.
    pub fn workers(&self) -> usize {
        self.settings.workers
    }
}

//! Settings file parsing and validation.

use super::patterns::{split_list, RepoFilter};
use super::ConfigError;
use crate::plugins::Ecosystem;
use crate::templates::TemplateRenderer;
use bstr::ByteSlice;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Upper bound on concurrent repository updates.
pub const MAX_WORKERS: usize = 20;

/// How finished updates reach the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Push to a dedicated branch and open or refresh a pull request.
    PullRequest,

    /// Push straight to the target branch.
    DirectPush,
}

impl DeliveryMode {
    /// Name exposed to templates.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PullRequest => "pull-request",
            Self::DirectPush => "direct-push",
        }
    }
}

/// Identity used for update commits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for GitAuthor {
    fn default() -> Self {
        Self {
            name: "Updati Bot".to_string(),
            email: "updati@github.com".to_string(),
        }
    }
}

/// Executables used by the Composer plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ComposerSettings {
    /// Composer entry point, passed to PHP as a script.
    pub binary: PathBuf,

    /// PHP runtime used when no versioned runtime matches.
    pub default_php: PathBuf,

    /// Versioned PHP runtimes keyed by "major.minor".
    pub php_runtimes: BTreeMap<String, PathBuf>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        let php_runtimes = ["8.2", "8.3", "8.4", "8.5"]
            .into_iter()
            .map(|version| {
                let binary = format!("/usr/bin/php{}", version.replace('.', ""));
                (version.to_string(), PathBuf::from(binary))
            })
            .collect();

        Self {
            binary: PathBuf::from("/usr/bin/composer"),
            default_php: PathBuf::from("/usr/bin/php"),
            php_runtimes,
        }
    }
}

/// Executables used by the npm plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NpmSettings {
    pub binary: PathBuf,
}

impl Default for NpmSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("npm"),
        }
    }
}

/// Settings for a run, read from a TOML file and environment overrides.
///
/// The GitHub token is read separately; see
/// [`resolve_token`](super::resolve_token).
///
/// ```toml
/// owner = "acme"
/// repo-patterns = ["^api-", "-service$"]
/// workers = 5
/// create-pr = true
/// labels = ["dependencies"]
///
/// [composer]
/// default-php = "/usr/bin/php"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Account (user or organization) whose repositories are updated.
    pub owner: String,

    /// Regular expressions matched against repository names. Empty matches all.
    pub repo_patterns: Vec<String>,

    /// Maximum number of repositories updated at once.
    pub workers: usize,

    pub update_composer: bool,
    pub update_npm: bool,

    /// Deliver through a pull request instead of pushing directly.
    pub create_pr: bool,

    /// Branch pushed to in direct-push mode. Defaults to each repository's default branch.
    pub base_branch: Option<String>,

    /// Branch pushed to in pull-request mode.
    pub pr_branch: String,

    /// Handlebars template for the commit message.
    pub commit_message: String,

    /// Handlebars template for the pull request title.
    pub pr_title: String,

    /// Handlebars template for the pull request body.
    pub pr_body: String,

    /// Run updates locally without pushing or touching pull requests.
    pub dry_run: bool,

    /// Labels attached to pull requests.
    pub labels: Vec<String>,

    /// Only update repositories whose composer.json requires laravel/framework.
    pub laravel_only: bool,

    /// Clone with `--depth 1`.
    pub shallow_clone: bool,

    pub git_author: GitAuthor,
    pub composer: ComposerSettings,
    pub npm: NpmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo_patterns: Vec::new(),
            workers: 5,
            update_composer: true,
            update_npm: true,
            create_pr: true,
            base_branch: None,
            pr_branch: "updati/dependencies".to_string(),
            commit_message: "chore(deps): update dependencies".to_string(),
            pr_title: "⬆️ Update dependencies".to_string(),
            pr_body: default_pr_body(),
            dry_run: false,
            labels: vec!["dependencies".to_string(), "automated".to_string()],
            laravel_only: false,
            shallow_clone: false,
            git_author: GitAuthor::default(),
            composer: ComposerSettings::default(),
            npm: NpmSettings::default(),
        }
    }
}

fn default_pr_body() -> String {
    "This PR was automatically created by Updati to update project dependencies.\n\n\
     Changed files:\n\
     {{#each changed_files}}\n- `{{this}}`\n{{/each}}"
        .to_string()
}

impl Settings {
    /// Loads settings from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Parses settings from TOML text; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] on malformed input.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Applies `UPDATI_*` and `INPUT_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides using `lookup` to read variables.
    ///
    /// For every setting the `UPDATI_` variable is read first and the
    /// GitHub Actions `INPUT_` variable second, so the latter wins. Empty
    /// values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| -> Option<String> {
            ["UPDATI_", "INPUT_"]
                .iter()
                .filter_map(|prefix| lookup(&format!("{prefix}{name}")))
                .filter(|v| !v.trim().is_empty())
                .last()
        };

        if let Some(owner) = read("OWNER") {
            self.owner = owner.trim().to_string();
        }
        if let Some(patterns) = read("REPO_PATTERNS") {
            self.repo_patterns = split_list(&patterns);
        }
        if let Some(workers) = read("WORKERS") {
            match workers.trim().parse::<usize>() {
                Ok(w) if w > 0 => self.workers = w,
                _ => warn!(value = %workers, "Ignoring invalid worker count override"),
            }
        }
        if let Some(branch) = read("BASE_BRANCH") {
            self.base_branch = Some(branch.trim().to_string());
        }
        if let Some(branch) = read("PR_BRANCH") {
            self.pr_branch = branch.trim().to_string();
        }
        if let Some(labels) = read("LABELS") {
            self.labels = split_list(&labels);
        }
        if read("DRY_RUN").is_some_and(|v| v.trim() == "true") {
            self.dry_run = true;
        }
        if let Some(create_pr) = read("CREATE_PR") {
            self.create_pr = create_pr.trim() == "true";
        }
    }

    /// Returns how updates are delivered.
    #[must_use]
    pub fn delivery_mode(&self) -> DeliveryMode {
        if self.create_pr {
            DeliveryMode::PullRequest
        } else {
            DeliveryMode::DirectPush
        }
    }

    /// Returns true if updates for `ecosystem` are enabled.
    #[must_use]
    pub fn is_enabled(&self, ecosystem: Ecosystem) -> bool {
        match ecosystem {
            Ecosystem::Composer => self.update_composer,
            Ecosystem::Npm => self.update_npm,
        }
    }

    /// Compiles the repository patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid regular expression.
    pub fn repo_filter(&self) -> Result<RepoFilter, ConfigError> {
        RepoFilter::new(&self.repo_patterns)
    }

    /// Checks every setting before any repository is touched.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(invalid("owner", "an owner is required"));
        }

        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(invalid(
                "workers",
                format!("must be between 1 and {MAX_WORKERS}, got {}", self.workers),
            ));
        }

        self.repo_filter()?;

        validate_branch("pr-branch", &self.pr_branch)?;
        if let Some(branch) = &self.base_branch {
            validate_branch("base-branch", branch)?;
        }

        if self.commit_message.trim().is_empty() {
            return Err(invalid("commit-message", "must not be empty"));
        }

        let renderer = TemplateRenderer::new();
        for (field, template) in [
            ("commit-message", &self.commit_message),
            ("pr-title", &self.pr_title),
            ("pr-body", &self.pr_body),
        ] {
            renderer
                .check(template)
                .map_err(|e| invalid(field, e.to_string()))?;
        }

        Ok(())
    }
}

fn validate_branch(field: &'static str, branch: &str) -> Result<(), ConfigError> {
    gix_validate::reference::name_partial(branch.as_bytes().as_bstr())
        .map(|_| ())
        .map_err(|e| invalid(field, format!("'{branch}' is not a valid branch name: {e}")))
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field,
        message: message.into(),
    }
}

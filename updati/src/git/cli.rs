//! [`Vcs`] implementation that shells out to the `git` binary.

use super::{CommitStatus, GitError, PushMode, Vcs};
use crate::config::GitAuthor;
use crate::discovery::Repository;
use crate::process::{self, ProcessError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Username GitHub expects alongside a token in HTTPS URLs.
const TOKEN_USERNAME: &str = "x-access-token";

/// Runs git subprocesses with interactive prompts disabled.
#[derive(Debug, Clone)]
pub struct GitCli {
    token: Option<String>,
    author: GitAuthor,
    shallow: bool,
}

impl GitCli {
    /// Creates a git runner that authenticates HTTPS remotes with `token`.
    #[must_use]
    pub fn new(token: Option<String>, author: GitAuthor) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            author,
            shallow: false,
        }
    }

    /// Clones with `--depth 1` instead of full history.
    #[must_use]
    pub fn with_shallow_clone(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    /// Runs a git command inside `path`.
    async fn run_git_command(
        &self,
        path: &Path,
        args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<Output, ProcessError> {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(path)
            .env("GIT_TERMINAL_PROMPT", "0");

        // Only the subcommand goes in the label; arguments may carry credentials.
        let label = format!("git {}", args.first().copied().unwrap_or_default());
        process::run(command, &label, cancel).await
    }

    /// Converts a process failure, scrubbing the token from captured output.
    fn fail(&self, error: ProcessError, wrap: impl FnOnce(String) -> GitError) -> GitError {
        match error {
            ProcessError::Cancelled { .. } => GitError::Cancelled,
            other => wrap(redact(&other.to_string(), self.token.as_deref())),
        }
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn clone_repository(
        &self,
        repository: &Repository,
        branch: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        debug!(repo = %repository.full_name, branch, shallow = self.shallow, "Cloning repository");

        let clone_url = authenticated_url(&repository.clone_url, self.token.as_deref())?;
        let mut args = vec!["clone", "--branch", branch];
        if self.shallow {
            args.extend(["--depth", "1", "--single-branch"]);
        }
        args.extend([clone_url.as_str(), "."]);

        self.run_git_command(destination, &args, cancel)
            .await
            .map_err(|e| self.fail(e, |message| GitError::CloneFailed { message }))?;
        Ok(())
    }

    async fn checkout_branch(
        &self,
        working_dir: &Path,
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        debug!(branch, "Resetting branch to current checkout");

        self.run_git_command(working_dir, &["checkout", "-B", branch], cancel)
            .await
            .map_err(|e| {
                self.fail(e, |message| GitError::BranchFailed {
                    branch: branch.to_string(),
                    message,
                })
            })?;
        Ok(())
    }

    async fn commit_all(
        &self,
        working_dir: &Path,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitStatus, GitError> {
        debug!("Committing changes");
        let commit_failed = |message: String| GitError::CommitFailed { message };

        for args in [
            ["config", "user.email", self.author.email.as_str()],
            ["config", "user.name", self.author.name.as_str()],
        ] {
            self.run_git_command(working_dir, &args, cancel)
                .await
                .map_err(|e| self.fail(e, commit_failed))?;
        }

        self.run_git_command(working_dir, &["add", "-A"], cancel)
            .await
            .map_err(|e| self.fail(e, commit_failed))?;

        let status = self
            .run_git_command(working_dir, &["status", "--porcelain"], cancel)
            .await
            .map_err(|e| self.fail(e, commit_failed))?;
        if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
            return Ok(CommitStatus::NothingToCommit);
        }

        match self
            .run_git_command(working_dir, &["commit", "-m", message], cancel)
            .await
        {
            Ok(_) => Ok(CommitStatus::Committed),
            Err(e) if is_nothing_to_commit(&e) => Ok(CommitStatus::NothingToCommit),
            Err(e) => Err(self.fail(e, commit_failed)),
        }
    }

    async fn push(
        &self,
        working_dir: &Path,
        branch: &str,
        mode: PushMode,
        cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        debug!(branch, ?mode, "Pushing branch");

        let refspec = format!("HEAD:refs/heads/{branch}");
        let mut args = vec!["push"];
        if mode == PushMode::Force {
            args.push("--force");
        }
        args.extend(["origin", refspec.as_str()]);

        self.run_git_command(working_dir, &args, cancel)
            .await
            .map_err(|e| self.fail(e, |message| GitError::PushFailed { message }))?;
        Ok(())
    }
}

/// Embeds `token` into an HTTPS clone URL.
///
/// Non-HTTPS URLs (local paths, `file://`, SSH) are returned unchanged.
///
/// # Errors
///
/// Returns [`GitError::InvalidUrl`] if an HTTPS URL cannot be rewritten.
pub fn authenticated_url(clone_url: &str, token: Option<&str>) -> Result<String, GitError> {
    let Some(token) = token else {
        return Ok(clone_url.to_string());
    };
    let Ok(mut url) = Url::parse(clone_url) else {
        return Ok(clone_url.to_string());
    };
    if url.scheme() != "https" {
        return Ok(clone_url.to_string());
    }

    let invalid = |_: ()| GitError::InvalidUrl {
        url: clone_url.to_string(),
        message: "cannot carry credentials".to_string(),
    };
    url.set_username(TOKEN_USERNAME).map_err(invalid)?;
    url.set_password(Some(token)).map_err(invalid)?;
    Ok(url.to_string())
}

fn is_nothing_to_commit(error: &ProcessError) -> bool {
    error
        .diagnostics()
        .is_some_and(|d| d.contains("nothing to commit"))
}

fn redact(message: &str, token: Option<&str>) -> String {
    match token {
        Some(token) => message.replace(token, "***"),
        None => message.to_string(),
    }
}

//! In-memory collaborators for pipeline tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use updati::process::ProcessError;
use updati::{
    CommitStatus, Ecosystem, GitError, HostError, NewPullRequest, Plugin, PluginError,
    PluginRegistry, PluginUpdate, PullRequestRef, PushMode, Repository, RepositoryHost, Settings,
    Updater, Vcs,
};

pub fn settings() -> Settings {
    Settings {
        owner: "acme".to_string(),
        ..Settings::default()
    }
}

pub fn repository(name: &str) -> Repository {
    Repository::new("acme", name, format!("https://github.com/acme/{name}.git"), "main")
}

pub fn composer_repository(name: &str) -> Repository {
    let mut repo = repository(name);
    repo.has_composer = true;
    repo
}

/// Hosting API backed by maps, recording every mutating call.
#[derive(Default)]
pub struct FakeHost {
    pub repositories: Vec<Repository>,
    /// (full_name, path) -> content
    pub files: HashMap<(String, String), String>,
    pub reject_labels: bool,
    pub open: Mutex<HashMap<(String, String, String), PullRequestRef>>,
    pub next_number: AtomicU64,
    pub calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn with_file(mut self, full_name: &str, path: &str, content: &str) -> Self {
        self.files
            .insert((full_name.to_string(), path.to_string()), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("find "))
            .collect()
    }

    pub fn open_pull_requests(&self) -> usize {
        self.open.lock().unwrap().len()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn list_repositories(&self, _owner: &str) -> Result<Vec<Repository>, HostError> {
        Ok(self.repositories.clone())
    }

    async fn file_content(
        &self,
        repository: &Repository,
        path: &str,
    ) -> Result<Option<String>, HostError> {
        Ok(self
            .files
            .get(&(repository.full_name.clone(), path.to_string()))
            .cloned())
    }

    async fn find_open_pull_request(
        &self,
        repository: &Repository,
        head: &str,
        base: &str,
    ) -> Result<Option<PullRequestRef>, HostError> {
        self.record(format!("find {} {head}->{base}", repository.full_name));
        let key = (repository.full_name.clone(), head.to_string(), base.to_string());
        Ok(self.open.lock().unwrap().get(&key).cloned())
    }

    async fn create_pull_request(
        &self,
        repository: &Repository,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostError> {
        self.record(format!("create {}", repository.full_name));
        let number = self.next_number.fetch_add(1, Ordering::SeqCst) + 1;
        let pr = PullRequestRef {
            number,
            url: format!("https://github.com/{}/pull/{number}", repository.full_name),
        };
        let key = (
            repository.full_name.clone(),
            request.head.clone(),
            request.base.clone(),
        );
        self.open.lock().unwrap().insert(key, pr.clone());
        Ok(pr)
    }

    async fn update_pull_request(
        &self,
        repository: &Repository,
        number: u64,
        _title: &str,
        _body: &str,
    ) -> Result<PullRequestRef, HostError> {
        self.record(format!("update {} #{number}", repository.full_name));
        Ok(PullRequestRef {
            number,
            url: format!("https://github.com/{}/pull/{number}", repository.full_name),
        })
    }

    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        self.record(format!(
            "label {} #{number} {}",
            repository.full_name,
            labels.join(",")
        ));
        if self.reject_labels {
            return Err(HostError::Rejected {
                message: "Validation Failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Version control that seeds clones from memory and records each call.
#[derive(Default)]
pub struct FakeVcs {
    /// full_name -> files written into every fresh clone
    pub seed: HashMap<String, Vec<(String, String)>>,
    pub failing_clones: HashSet<String>,
    /// Clones wait for cancellation instead of completing.
    pub block_clones: bool,
    pub nothing_to_commit: bool,
    pub calls: Mutex<Vec<String>>,
    pub working_copies: Mutex<Vec<PathBuf>>,
}

impl FakeVcs {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn working_copies(&self) -> Vec<PathBuf> {
        self.working_copies.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn clone_repository(
        &self,
        repository: &Repository,
        branch: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        self.record(format!("clone {}@{branch}", repository.full_name));
        self.working_copies
            .lock()
            .unwrap()
            .push(destination.to_path_buf());

        if self.block_clones {
            cancel.cancelled().await;
            return Err(GitError::Cancelled);
        }
        if self.failing_clones.contains(&repository.full_name) {
            return Err(GitError::CloneFailed {
                message: "git clone failed: repository not found".to_string(),
            });
        }

        for (path, content) in self.seed.get(&repository.full_name).into_iter().flatten() {
            std::fs::write(destination.join(path), content).unwrap();
        }
        Ok(())
    }

    async fn checkout_branch(
        &self,
        _working_dir: &Path,
        branch: &str,
        _cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        self.record(format!("checkout {branch}"));
        Ok(())
    }

    async fn commit_all(
        &self,
        _working_dir: &Path,
        message: &str,
        _cancel: &CancellationToken,
    ) -> Result<CommitStatus, GitError> {
        self.record(format!("commit {message}"));
        if self.nothing_to_commit {
            Ok(CommitStatus::NothingToCommit)
        } else {
            Ok(CommitStatus::Committed)
        }
    }

    async fn push(
        &self,
        _working_dir: &Path,
        branch: &str,
        mode: PushMode,
        _cancel: &CancellationToken,
    ) -> Result<(), GitError> {
        match mode {
            PushMode::Force => self.record(format!("force-push {branch}")),
            PushMode::FastForward => self.record(format!("push {branch}")),
        }
        Ok(())
    }
}

/// What a [`FakePlugin`] does when run.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Rewrites the lockfile with the given content.
    Write(&'static str),
    /// Leaves the working copy untouched.
    Nothing,
    /// Exits with the given diagnostics.
    Fail(&'static str),
}

/// Plugin that rewrites a lockfile according to scripted behaviors.
pub struct FakePlugin {
    name: &'static str,
    ecosystem: Ecosystem,
    lockfile: &'static str,
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    runs: AtomicUsize,
}

impl FakePlugin {
    pub fn composer(fallback: Behavior) -> Self {
        Self::new("composer", Ecosystem::Composer, "composer.lock", fallback)
    }

    pub fn npm(fallback: Behavior) -> Self {
        Self::new("npm", Ecosystem::Npm, "package-lock.json", fallback)
    }

    fn new(
        name: &'static str,
        ecosystem: Ecosystem,
        lockfile: &'static str,
        fallback: Behavior,
    ) -> Self {
        Self {
            name,
            ecosystem,
            lockfile,
            script: Mutex::new(VecDeque::new()),
            fallback,
            runs: AtomicUsize::new(0),
        }
    }

    /// Behaviors used, in order, before falling back.
    pub fn then(self, behaviors: impl IntoIterator<Item = Behavior>) -> Self {
        self.script.lock().unwrap().extend(behaviors);
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for FakePlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn detect(&self, repository: &Repository) -> bool {
        match self.ecosystem {
            Ecosystem::Composer => repository.has_composer,
            Ecosystem::Npm => repository.has_npm,
        }
    }

    async fn update(
        &self,
        working_dir: &Path,
        _cancel: &CancellationToken,
    ) -> Result<PluginUpdate, PluginError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match behavior {
            Behavior::Write(content) => {
                let path = working_dir.join(self.lockfile);
                let changed = std::fs::read_to_string(&path).ok().as_deref() != Some(content);
                std::fs::write(&path, content).unwrap();
                Ok(PluginUpdate {
                    changed,
                    changed_files: if changed {
                        vec![self.lockfile.to_string()]
                    } else {
                        Vec::new()
                    },
                })
            }
            Behavior::Nothing => Ok(PluginUpdate::default()),
            Behavior::Fail(diagnostics) => Err(PluginError::Command(ProcessError::Failed {
                program: format!("{} update", self.name),
                diagnostics: diagnostics.to_string(),
            })),
        }
    }
}

/// Test harness wiring an [`Updater`] to fakes.
pub struct Harness {
    pub host: Arc<FakeHost>,
    pub vcs: Arc<FakeVcs>,
    pub updater: Arc<Updater>,
}

impl Harness {
    pub fn new(
        settings: Settings,
        host: FakeHost,
        vcs: FakeVcs,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Self {
        let host = Arc::new(host);
        let vcs = Arc::new(vcs);
        let mut registry = PluginRegistry::new();
        for plugin in plugins {
            registry.register(plugin);
        }

        let updater = Updater::new(
            Arc::new(settings),
            Arc::new(registry),
            host.clone(),
            vcs.clone(),
        );

        Self {
            host,
            vcs,
            updater: Arc::new(updater),
        }
    }
}

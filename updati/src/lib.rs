#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod discovery;
pub mod fingerprint;
pub mod gateway;
pub mod git;
pub mod plugins;
pub mod pool;
pub mod process;
pub mod pull_requests;
pub mod rate_limit;
pub mod runner;
pub mod summary;
pub mod templates;
pub mod updater;

pub use config::{resolve_token, ConfigError, DeliveryMode, RepoFilter, Settings};
pub use discovery::{detect_capabilities, discover_repositories, DiscoveryError, Repository};
pub use fingerprint::{fingerprint, Fingerprint};
pub use gateway::{GitHubHost, HostError, NewPullRequest, PullRequestRef, RepositoryHost};
pub use git::{CommitStatus, GitCli, GitError, PushMode, Vcs};
pub use plugins::{
    ComposerPlugin, Ecosystem, NpmPlugin, Plugin, PluginError, PluginRegistry, PluginUpdate,
};
pub use pool::WorkerPool;
pub use pull_requests::{reconcile_pull_request, PrAction, ReconciledPullRequest};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{OutcomeStatus, RunSummary, UpdateOutcome};
pub use templates::{TemplateError, TemplateRenderer, UpdateContext};
pub use updater::{UpdateError, Updater, WorkingCopy};

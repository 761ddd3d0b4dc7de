//! GitHub implementation of [`RepositoryHost`].

use super::{HostError, NewPullRequest, PullRequestRef, RepositoryHost};
use crate::discovery::Repository;
use crate::rate_limit::ensure_core_rate_limit;
use async_trait::async_trait;
use octocrab::models;
use octocrab::{Octocrab, Page};
use tracing::{debug, warn};

/// Results per page for repository listings.
const RESULTS_PER_PAGE: u8 = 100;

/// [`RepositoryHost`] backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubHost {
    octocrab: Octocrab,
}

impl GitHubHost {
    /// Builds a host authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(token: &str) -> Result<Self, HostError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self { octocrab })
    }

    async fn list_user_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError> {
        let page = self
            .octocrab
            .users(owner)
            .repos()
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;
        self.collect_pages(page).await
    }

    async fn list_org_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError> {
        let page = self
            .octocrab
            .orgs(owner)
            .list_repos()
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;
        self.collect_pages(page).await
    }

    /// Drains every page following `first`.
    async fn collect_pages(
        &self,
        mut first: Page<models::Repository>,
    ) -> Result<Vec<Repository>, HostError> {
        let mut next = first.next.take();
        let mut repositories: Vec<Repository> = first
            .take_items()
            .into_iter()
            .filter_map(convert_repository)
            .collect();

        while let Some(mut page) = self
            .octocrab
            .get_page::<models::Repository>(&next)
            .await?
        {
            next = page.next.take();
            repositories.extend(page.take_items().into_iter().filter_map(convert_repository));
        }

        Ok(repositories)
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        match self.list_user_repositories(owner).await {
            Ok(repositories) => Ok(repositories),
            Err(e) => {
                debug!(owner, error = %e, "User listing rejected, retrying as organization");
                self.list_org_repositories(owner).await
            }
        }
    }

    async fn file_content(
        &self,
        repository: &Repository,
        path: &str,
    ) -> Result<Option<String>, HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let result = self
            .octocrab
            .repos(&repository.owner, &repository.name)
            .get_content()
            .path(path)
            .r#ref(&repository.default_branch)
            .send()
            .await;

        match result {
            Ok(content) => Ok(content
                .items
                .into_iter()
                .next()
                .map(|item| item.decoded_content().unwrap_or_default())),
            Err(e) => {
                let error = HostError::from(e);
                if error.is_not_found() {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn find_open_pull_request(
        &self,
        repository: &Repository,
        head: &str,
        base: &str,
    ) -> Result<Option<PullRequestRef>, HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let page = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .list()
            .state(octocrab::params::State::Open)
            .head(format!("{}:{}", repository.owner, head))
            .base(base)
            .send()
            .await?;

        if page.items.len() > 1 {
            warn!(
                repo = %repository.full_name,
                head,
                base,
                count = page.items.len(),
                "Multiple open pull requests for the same branch pair, using the first"
            );
        }

        Ok(page
            .items
            .first()
            .map(|pr| pull_request_ref(repository, pr)))
    }

    async fn create_pull_request(
        &self,
        repository: &Repository,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .send()
            .await?;

        Ok(pull_request_ref(repository, &pr))
    }

    async fn update_pull_request(
        &self,
        repository: &Repository,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef, HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await?;

        Ok(pull_request_ref(repository, &pr))
    }

    async fn add_labels(
        &self,
        repository: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repository.owner, &repository.name)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }
}

/// Converts an API repository into a descriptor, skipping archived ones.
fn convert_repository(repo: models::Repository) -> Option<Repository> {
    let owner = repo.owner.as_ref()?.login.clone();
    if repo.archived.unwrap_or(false) {
        debug!(repo = %repo.name, "Skipping archived repository");
        return None;
    }

    let clone_url = repo
        .clone_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("https://github.com/{}/{}.git", owner, repo.name));
    let default_branch = repo.default_branch.unwrap_or_else(|| "main".to_string());

    Some(Repository::new(owner, repo.name, clone_url, default_branch))
}

fn pull_request_ref(repository: &Repository, pr: &models::pulls::PullRequest) -> PullRequestRef {
    let url = pr
        .html_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| {
            format!(
                "https://github.com/{}/pull/{}",
                repository.full_name, pr.number
            )
        });

    PullRequestRef {
        number: pr.number,
        url,
    }
}

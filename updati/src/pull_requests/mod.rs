//! Pull request reconciliation.
//!
//! Every run pushes to the same branch, so at most one open pull request
//! per head/base pair is maintained: an existing one is updated in place,
//! otherwise a new one is opened.

mod status;

pub use status::{PrAction, ReconciledPullRequest};

use crate::discovery::Repository;
use crate::gateway::{HostError, NewPullRequest, RepositoryHost};
use tracing::{info, warn};

/// Creates or refreshes the pull request for `request.head` → `request.base`.
///
/// Labels are applied on both paths. Label failures are returned as
/// warnings rather than errors.
///
/// # Errors
///
/// Returns an error if the lookup, creation or update request fails.
pub async fn reconcile_pull_request(
    host: &dyn RepositoryHost,
    repository: &Repository,
    request: &NewPullRequest,
    labels: &[String],
) -> Result<ReconciledPullRequest, HostError> {
    let existing = host
        .find_open_pull_request(repository, &request.head, &request.base)
        .await?;

    let (pull_request, action) = match existing {
        Some(open) => {
            let updated = host
                .update_pull_request(repository, open.number, &request.title, &request.body)
                .await?;
            info!(pr_number = updated.number, "Updated existing pull request");
            (updated, PrAction::Updated)
        }
        None => {
            let created = host.create_pull_request(repository, request).await?;
            info!(pr_number = created.number, "Created pull request");
            (created, PrAction::Created)
        }
    };

    let mut warnings = Vec::new();
    if !labels.is_empty() {
        if let Err(e) = host.add_labels(repository, pull_request.number, labels).await {
            warn!(pr_number = pull_request.number, error = %e, "Failed to add labels");
            warnings.push(format!("failed to add labels: {e}"));
        }
    }

    Ok(ReconciledPullRequest {
        pull_request,
        action,
        warnings,
    })
}

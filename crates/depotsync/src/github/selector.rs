use chrono::{DateTime, Utc};
use depotsync_fetch::HttpClient;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::GitHubApi;
use super::types::Branch;
use crate::error::Error;

/// Head of the branch named after the application in one candidate repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub repo: String,
    pub updated_at: DateTime<Utc>,
    pub sha: String,
}

/// Why a candidate repository was left out of selection.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no branch for this application")]
    NoBranch,

    #[error("branch carries no commit data")]
    NoCommit,

    #[error(transparent)]
    Unavailable(#[from] Error),
}

/// Latest candidate by commit time. Equal times keep the earlier candidate.
pub fn pick_latest(candidates: impl IntoIterator<Item = CommitInfo>) -> Option<CommitInfo> {
    let mut best: Option<CommitInfo> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.updated_at <= current.updated_at => {}
            _ => best = Some(candidate),
        }
    }
    best
}

impl<C: HttpClient> GitHubApi<C> {
    /// Query `repo`'s branch named `app_id`.
    pub async fn branch_commit(
        &self,
        repo: &str,
        app_id: &str,
    ) -> std::result::Result<CommitInfo, SelectError> {
        let url = self.url(&format!("repos/{repo}/branches/{app_id}"));
        let branch: Branch = match self.get_json(&url).await {
            Ok(branch) => branch,
            Err(Error::Status { status: 404, .. }) => return Err(SelectError::NoBranch),
            Err(e) => return Err(e.into()),
        };

        let commit = branch.commit.ok_or(SelectError::NoCommit)?;
        let updated_at = commit.commit.date().ok_or(SelectError::NoCommit)?;
        Ok(CommitInfo {
            repo: repo.to_string(),
            updated_at,
            sha: commit.sha,
        })
    }

    /// Query every candidate in order and keep the most recently updated one.
    ///
    /// A candidate that cannot be queried is logged and skipped; it never stops
    /// the remaining candidates from being evaluated.
    pub async fn select_repository(&self, repos: &[String], app_id: &str) -> Option<CommitInfo> {
        let mut found = Vec::with_capacity(repos.len());

        for repo in repos {
            match self.branch_commit(repo, app_id).await {
                Ok(info) => {
                    debug!(repo = %info.repo, sha = %info.sha, updated_at = %info.updated_at, "candidate branch");
                    found.push(info);
                }
                Err(SelectError::NoBranch) => {
                    debug!(%repo, app_id, "candidate has no branch");
                }
                Err(e) => {
                    warn!(%repo, app_id, error = %e, "skipping candidate repository");
                }
            }
        }

        let selected = pick_latest(found);
        match &selected {
            Some(info) => info!(repo = %info.repo, updated_at = %info.updated_at, "selected repository"),
            None => info!(app_id, "no candidate repository has this application"),
        }
        selected
    }
}

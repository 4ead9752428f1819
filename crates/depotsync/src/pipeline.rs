//! The resolve-and-fetch run for one application id.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use depotsync_fetch::{CdnFetcher, HttpClient, Locality};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::{CommitInfo, GitHubApi, QuotaReport, TreeEntry};
use crate::keyfile::{DepotKey, parse_key_file};
use crate::manifest::{DepotMap, EntryKind, ManifestName};
use crate::storage::ManifestStore;

/// What happens when one tree entry cannot be fetched from any mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryFailurePolicy {
    /// Abort the run with the first unavailable file.
    #[default]
    FailFast,
    /// Record the failure and keep going; the result is partial.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub path: String,
    pub message: String,
}

/// Result of one run. Built fresh per call; nothing carries over between runs
/// except the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub app_id: String,
    pub repository: Option<CommitInfo>,
    pub depot_keys: Vec<DepotKey>,
    pub depots: DepotMap,
    /// Tree paths written during this run.
    pub downloaded: BTreeSet<String>,
    /// Tree paths that were already on disk and left alone.
    pub already_present: BTreeSet<String>,
    /// Entries skipped under [`EntryFailurePolicy::BestEffort`].
    pub failures: Vec<EntryFailure>,
}

impl Resolution {
    fn empty(app_id: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            ..Self::default()
        }
    }

    /// No keys and no manifests: the "nothing found" outcome.
    pub fn is_empty(&self) -> bool {
        self.depot_keys.is_empty() && self.depots.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Local paths of this run's downloads that still exist and are non-empty.
    pub fn deliverable_files(&self, store: &ManifestStore) -> Vec<PathBuf> {
        self.downloaded
            .iter()
            .filter_map(|path| store.destination(path))
            .filter(|dest| matches!(store.len(dest), Ok(Some(len)) if len > 0))
            .collect()
    }
}

/// Wires the selector, tree walker and mirror fetcher over one HTTP client.
pub struct Resolver<C: HttpClient> {
    github: GitHubApi<C>,
    cdn: CdnFetcher<C>,
    store: ManifestStore,
    repositories: Vec<String>,
    policy: EntryFailurePolicy,
}

impl<C: HttpClient> Resolver<C> {
    pub fn new(client: Arc<C>, config: &Config, locality: Locality) -> Result<Self> {
        let mirrors = config.mirrors.policy(locality, config.max_rounds)?;
        Ok(Self {
            github: GitHubApi::new(client.clone(), &config.api_base, config.api_headers()),
            cdn: CdnFetcher::new(client, mirrors),
            store: ManifestStore::new(&config.storage_dir),
            repositories: config.repositories.clone(),
            policy: config.failure_policy,
        })
    }

    pub fn with_policy(mut self, policy: EntryFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub async fn check_rate_limit(&self) -> QuotaReport {
        self.github.check_rate_limit().await
    }

    /// Pick the freshest candidate repository for `app_id`, download its
    /// manifests that are not on disk yet, and collect its depot keys.
    ///
    /// No matching repository is an empty [`Resolution`], not an error.
    pub async fn resolve_and_fetch(&self, app_id: &str) -> Result<Resolution> {
        validate_app_id(app_id)?;
        self.store.ensure()?;

        let Some(commit) = self
            .github
            .select_repository(&self.repositories, app_id)
            .await
        else {
            return Ok(Resolution::empty(app_id));
        };

        info!(repo = %commit.repo, sha = %commit.sha, updated_at = %commit.updated_at, "walking repository tree");
        let entries = self.github.list_tree(&commit.repo, &commit.sha).await?;

        let mut run = Resolution::empty(app_id);
        for entry in &entries {
            self.visit(&commit, entry, &mut run).await?;
        }
        run.depots.sort_descending();
        run.repository = Some(commit);

        info!(
            app_id,
            depots = run.depots.len(),
            keys = run.depot_keys.len(),
            downloaded = run.downloaded.len(),
            already_present = run.already_present.len(),
            failures = run.failures.len(),
            "resolution finished"
        );
        Ok(run)
    }

    async fn visit(&self, commit: &CommitInfo, entry: &TreeEntry, run: &mut Resolution) -> Result<()> {
        match EntryKind::classify(&entry.path) {
            EntryKind::Manifest => self.visit_manifest(commit, entry, run).await,
            EntryKind::KeyFile => self.visit_key_file(commit, entry, run).await,
            EntryKind::Ignored => Ok(()),
        }
    }

    async fn visit_manifest(
        &self,
        commit: &CommitInfo,
        entry: &TreeEntry,
        run: &mut Resolution,
    ) -> Result<()> {
        let path = &entry.path;
        let Some(dest) = self.store.destination(path) else {
            warn!(%path, "skipping tree path outside the storage directory");
            return Ok(());
        };

        if self.store.exists(&dest)? {
            info!(%path, dest = %dest.display(), "manifest already present");
            run.already_present.insert(path.clone());
        } else {
            match self.cdn.fetch(&commit.repo, &commit.sha, path).await {
                Ok(content) => {
                    self.store.write(&dest, &content)?;
                    info!(%path, bytes = content.len(), "manifest downloaded");
                    run.downloaded.insert(path.clone());
                }
                Err(e) => return self.entry_failed(path, e.into(), run),
            }
        }

        match ManifestName::parse(path) {
            Some(name) => run.depots.push(name),
            None => debug!(%path, "manifest name off convention; not mapped"),
        }
        Ok(())
    }

    async fn visit_key_file(
        &self,
        commit: &CommitInfo,
        entry: &TreeEntry,
        run: &mut Resolution,
    ) -> Result<()> {
        let path = &entry.path;
        match self.cdn.fetch(&commit.repo, &commit.sha, path).await {
            Ok(content) => {
                let keys = parse_key_file(&content);
                if keys.is_empty() {
                    warn!(%path, "no depot keys found in key file");
                } else {
                    info!(%path, keys = keys.len(), "parsed key file");
                }
                run.depot_keys.extend(keys);
                Ok(())
            }
            Err(e) => self.entry_failed(path, e.into(), run),
        }
    }

    fn entry_failed(&self, path: &str, error: Error, run: &mut Resolution) -> Result<()> {
        match self.policy {
            EntryFailurePolicy::FailFast => Err(error),
            EntryFailurePolicy::BestEffort => {
                warn!(%path, %error, "skipping unavailable entry");
                run.failures.push(EntryFailure {
                    path: path.to_string(),
                    message: error.to_string(),
                });
                Ok(())
            }
        }
    }
}

/// Application ids become a URL path segment and a branch name.
fn validate_app_id(app_id: &str) -> Result<()> {
    let ok = !app_id.is_empty()
        && !app_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'));
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidAppId(app_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_app_id() {
        assert!(validate_app_id("228980").is_ok());
        assert!(validate_app_id("").is_err());
        assert!(validate_app_id("1/2").is_err());
        assert!(validate_app_id("1 2").is_err());
        assert!(validate_app_id("1?x=2").is_err());
    }

    #[test]
    fn test_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&EntryFailurePolicy::BestEffort).unwrap(),
            "\"best-effort\""
        );
        assert_eq!(
            serde_json::from_str::<EntryFailurePolicy>("\"fail-fast\"").unwrap(),
            EntryFailurePolicy::FailFast
        );
    }

    #[test]
    fn test_empty_resolution() {
        let r = Resolution::empty("1");
        assert!(r.is_empty());
        assert!(!r.is_partial());
        assert_eq!(r.app_id, "1");
    }
}

use depotsync_fetch::HttpClient;
use tracing::{debug, warn};

use super::GitHubApi;
use super::types::{GitCommit, Tree};
use crate::error::Result;

/// A file path in a commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
}

impl<C: HttpClient> GitHubApi<C> {
    /// Every file path at `sha`: resolve the commit to its root tree, then list
    /// that tree recursively. Directory entries are dropped.
    pub async fn list_tree(&self, repo: &str, sha: &str) -> Result<Vec<TreeEntry>> {
        let commit_url = self.url(&format!("repos/{repo}/git/commits/{sha}"));
        let commit: GitCommit = self.get_json(&commit_url).await?;
        debug!(%repo, commit = %commit.sha, tree = %commit.tree.sha, "resolved commit tree");

        let tree_url = self.url(&format!(
            "repos/{repo}/git/trees/{}?recursive=1",
            commit.tree.sha
        ));
        let tree: Tree = self.get_json(&tree_url).await?;
        if tree.truncated {
            warn!(%repo, %sha, "tree listing was truncated by the API; some files are missing");
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|item| item.kind != "tree")
            .map(|item| TreeEntry { path: item.path })
            .collect())
    }
}

//! Response shapes of the hosting API, reduced to the fields used.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Branch {
    pub commit: Option<BranchCommit>,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

impl CommitDetail {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.author
            .as_ref()
            .or(self.committer.as_ref())
            .map(|s| s.date)
    }
}

#[derive(Debug, Deserialize)]
pub struct Signature {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

/// `GET /repos/{repo}/git/commits/{sha}`
#[derive(Debug, Deserialize)]
pub struct GitCommit {
    pub sha: String,
    pub tree: TreeRef,
}

/// `GET /repos/{repo}/git/trees/{sha}?recursive=1`
#[derive(Debug, Deserialize)]
pub struct Tree {
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreeItem {
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// `GET /rate_limit`
#[derive(Debug, Default, Deserialize)]
pub struct RateLimit {
    #[serde(default)]
    pub rate: RateSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateSection {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
    pub used: u64,
}

impl Default for RateSection {
    fn default() -> Self {
        Self {
            limit: 60,
            remaining: 0,
            reset: 0,
            used: 0,
        }
    }
}

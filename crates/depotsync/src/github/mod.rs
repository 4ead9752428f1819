//! Hosting API access: branch lookup, tree listing and quota.

mod rate;
mod selector;
mod tree;
pub mod types;

use std::sync::Arc;

use depotsync_fetch::{HttpClient, HttpResponse};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub use rate::{QuotaReport, RateLimitStatus};
pub use selector::{CommitInfo, SelectError, pick_latest};
pub use tree::TreeEntry;

pub struct GitHubApi<C: HttpClient> {
    client: Arc<C>,
    base: String,
    headers: Vec<(String, String)>,
}

impl<C: HttpClient> GitHubApi<C> {
    pub fn new(client: Arc<C>, base: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            client,
            base,
            headers,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.client
            .get(url, &self.headers)
            .await
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// GET and decode a `200` JSON body; any other status is an error.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let res = self.get(url).await?;
        if !res.is_ok() {
            return Err(Error::Status {
                url: url.to_string(),
                status: res.status,
            });
        }
        res.json().map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}

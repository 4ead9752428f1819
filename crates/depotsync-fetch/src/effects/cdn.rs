use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::http::HttpClient;
use crate::core::schedule;
use crate::data::MirrorPolicy;
use crate::error::{Error, Result};

/// Downloads one repository file at a pinned commit through a [`MirrorPolicy`].
///
/// Endpoints are tried strictly one after another; the first `200` wins.
/// Mirrors receive no custom headers.
pub struct CdnFetcher<C: HttpClient> {
    client: Arc<C>,
    policy: MirrorPolicy,
}

impl<C: HttpClient> CdnFetcher<C> {
    pub fn new(client: Arc<C>, policy: MirrorPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn fetch(&self, repo: &str, sha: &str, path: &str) -> Result<Bytes> {
        let mut attempts = 0usize;

        for attempt in schedule(&self.policy) {
            let url = attempt.endpoint.render(repo, sha, path);
            attempts += 1;

            match self.client.get(&url, &[]).await {
                Ok(res) if res.is_ok() => {
                    debug!(%url, round = attempt.round, rank = attempt.rank, bytes = res.body.len(), "fetched file");
                    return Ok(res.body);
                }
                Ok(res) => {
                    debug!(%url, status = res.status, round = attempt.round, "mirror returned non-200");
                }
                Err(e) => {
                    debug!(%url, error = %e, round = attempt.round, "mirror request failed");
                }
            }
        }

        Err(Error::ContentUnavailable {
            path: path.to_string(),
            attempts,
        })
    }
}

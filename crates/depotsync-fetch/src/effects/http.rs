use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// A fully buffered HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only `200 OK` counts; mirrors answering `204` or `206` are treated as misses.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Used for both hosting-API calls and mirror downloads. Implementations
/// must bound every request with a timeout; non-2xx statuses are returned as
/// responses, not errors.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - [`crate::mock::MockHttpClient`]: scripted replies for tests
pub trait HttpClient: Send + Sync {
    /// Transport-level failure (DNS, connect, timeout, body read).
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use std::time::Duration;

    use crate::error::{Error, Result};

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub const USER_AGENT: &'static str =
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

        /// Build a client whose requests give up after `timeout`.
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .connect_timeout(timeout)
                .user_agent(Self::USER_AGENT)
                .build()
                .map_err(Error::ClientBuild)?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<HttpResponse, Self::Error> {
            let mut request = self.client.get(url);

            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;

            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;

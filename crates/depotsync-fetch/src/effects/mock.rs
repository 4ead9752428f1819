//! Scripted in-memory [`HttpClient`] for tests.
//!
//! Each URL maps to a list of replies; the n-th request to a URL gets the
//! n-th reply, and the last reply repeats. Unknown URLs answer `404`.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use super::http::{HttpClient, HttpResponse};

#[derive(Debug, thiserror::Error)]
#[error("mock transport error: {0}")]
pub struct MockError(pub String);

#[derive(Clone, Debug)]
pub enum MockReply {
    Status(u16, Bytes),
    Fail(String),
}

impl MockReply {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::Status(200, body.into())
    }

    pub fn status(status: u16) -> Self {
        Self::Status(status, Bytes::new())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

#[derive(Debug, Default)]
struct State {
    routes: HashMap<String, Vec<MockReply>>,
    served: HashMap<String, usize>,
    requests: Vec<(String, Vec<(String, String)>)>,
}

#[derive(Debug, Default)]
pub struct MockHttpClient {
    state: Mutex<State>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `reply` for `url`.
    pub fn on(self, url: impl Into<String>, reply: MockReply) -> Self {
        self.on_sequence(url, vec![reply])
    }

    /// Answer `replies` in order for `url`, repeating the last one.
    pub fn on_sequence(self, url: impl Into<String>, replies: Vec<MockReply>) -> Self {
        self.lock().routes.insert(url.into(), replies);
        self
    }

    /// Every requested URL, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.iter().map(|(u, _)| u.clone()).collect()
    }

    /// Headers sent with the most recent request to `url`.
    pub fn headers_for(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.lock()
            .requests
            .iter()
            .rev()
            .find(|(u, _)| u == url)
            .map(|(_, h)| h.clone())
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn clear_requests(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.served.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reply_for(&self, url: &str, headers: &[(String, String)]) -> MockReply {
        let mut state = self.lock();
        state.requests.push((url.to_string(), headers.to_vec()));

        let served = state.served.entry(url.to_string()).or_insert(0);
        let index = *served;
        *served += 1;

        match state.routes.get(url) {
            Some(replies) if !replies.is_empty() => {
                replies[index.min(replies.len() - 1)].clone()
            }
            _ => MockReply::status(404),
        }
    }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<HttpResponse, Self::Error> {
        match self.reply_for(url, headers) {
            MockReply::Status(status, body) => Ok(HttpResponse { status, body }),
            MockReply::Fail(message) => Err(MockError(message)),
        }
    }
}

//! I/O operations: the HTTP capability and the mirror walker built on it.

mod cdn;
mod http;

pub mod mock;

pub use cdn::CdnFetcher;
pub use http::{HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;

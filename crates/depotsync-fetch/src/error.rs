//! Error types for depotsync-fetch.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file unavailable after {attempts} attempts across all mirrors: {path}")]
    ContentUnavailable { path: String, attempts: usize },

    #[error("no mirror endpoints configured")]
    NoEndpoints,

    #[error("mirror policy needs at least one round")]
    ZeroRounds,

    #[error("invalid endpoint template {template}: missing {placeholder}")]
    InvalidTemplate {
        template: String,
        placeholder: &'static str,
    },

    #[cfg(feature = "reqwest")]
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

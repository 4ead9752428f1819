//! Error types for depotsync.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] depotsync_fetch::Error),

    #[error(transparent)]
    Storage(#[from] depotsync_fs::Error),

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid application id {0:?}")]
    InvalidAppId(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: depotsync_fs::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

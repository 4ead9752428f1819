//! Resolve the newest depot manifests and keys for an application.
//!
//! A run picks, among the configured candidate repositories, the one whose
//! branch named after the application was updated last; lists that commit's
//! tree; downloads every `*.manifest` not yet on disk through ranked mirrors;
//! parses every `key.vdf`; and maps each depot to its manifests, newest first.
//!
//! ```no_run
//! # async fn run() -> depotsync::Result<()> {
//! use std::sync::Arc;
//! use depotsync::{Config, Resolver};
//! use depotsync_fetch::{Locality, ReqwestClient};
//!
//! let config = Config::load(None)?;
//! let client = Arc::new(ReqwestClient::new(config.timeout())?);
//! let resolver = Resolver::new(client, &config, Locality::Global)?;
//!
//! let quota = resolver.check_rate_limit().await;
//! let run = resolver.resolve_and_fetch("228980").await?;
//! # let _ = (quota, run);
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod github;
pub mod ids;
pub mod keyfile;
pub mod manifest;
pub mod pipeline;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use github::{CommitInfo, QuotaReport, RateLimitStatus};
pub use ids::NumericId;
pub use keyfile::{DepotKey, parse_key_file};
pub use manifest::{DepotMap, EntryKind, ManifestName};
pub use pipeline::{EntryFailure, EntryFailurePolicy, Resolution, Resolver};
pub use storage::ManifestStore;

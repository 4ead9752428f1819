//! HTTP capability and ranked-mirror retrieval.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and types
//! - [`core`] - Pure transformations
//! - [`effects`] - I/O operations with trait abstraction
//!
//! A [`MirrorPolicy`] is a ranked list of [`EndpointTemplate`]s plus a number
//! of outer rounds. [`CdnFetcher`] walks the whole list once per round and
//! stops at the first `200`, so a single file costs at most
//! `max_rounds * endpoints.len()` requests.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{Attempt, schedule};
pub use data::{EndpointTemplate, Locality, MirrorPolicy, MirrorSet};
pub use effects::{CdnFetcher, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use effects::mock;

pub use error::{Error, Result};

//! Immutable configuration types for mirror retrieval.

mod mirrors;

pub use mirrors::{EndpointTemplate, Locality, MirrorPolicy, MirrorSet};

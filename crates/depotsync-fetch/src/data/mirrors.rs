use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const PLACEHOLDERS: [&str; 3] = ["{repo}", "{sha}", "{path}"];

/// A mirror URL pattern such as `https://raw.example.com/{repo}/{sha}/{path}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if let Some(missing) = PLACEHOLDERS.iter().find(|p| !template.contains(*p)) {
            return Err(Error::InvalidTemplate {
                template,
                placeholder: missing,
            });
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, repo: &str, sha: &str, path: &str) -> String {
        crate::core::render_template(&self.0, repo, sha, path)
    }
}

impl TryFrom<String> for EndpointTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<EndpointTemplate> for String {
    fn from(value: EndpointTemplate) -> Self {
        value.0
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which network the caller sits in, as reported by an external detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locality {
    /// Direct access to the hosting platform's raw content is unreliable.
    Restricted,
    #[default]
    Global,
}

impl Locality {
    pub fn from_restricted(restricted: bool) -> Self {
        if restricted {
            Self::Restricted
        } else {
            Self::Global
        }
    }
}

/// The two disjoint ranked endpoint lists, one per [`Locality`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSet {
    pub restricted: Vec<EndpointTemplate>,
    pub global: Vec<EndpointTemplate>,
}

impl MirrorSet {
    pub fn endpoints(&self, locality: Locality) -> &[EndpointTemplate] {
        match locality {
            Locality::Restricted => &self.restricted,
            Locality::Global => &self.global,
        }
    }

    pub fn policy(&self, locality: Locality, max_rounds: u32) -> Result<MirrorPolicy> {
        MirrorPolicy::new(self.endpoints(locality).to_vec(), max_rounds)
    }
}

/// Bounded retry over a ranked endpoint pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorPolicy {
    endpoints: Vec<EndpointTemplate>,
    max_rounds: u32,
}

impl MirrorPolicy {
    pub const DEFAULT_ROUNDS: u32 = 3;

    pub fn new(endpoints: Vec<EndpointTemplate>, max_rounds: u32) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        if max_rounds == 0 {
            return Err(Error::ZeroRounds);
        }
        Ok(Self {
            endpoints,
            max_rounds,
        })
    }

    pub fn endpoints(&self) -> &[EndpointTemplate] {
        &self.endpoints
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Worst-case number of requests for one file.
    pub fn max_requests(&self) -> usize {
        self.endpoints.len() * self.max_rounds as usize
    }
}

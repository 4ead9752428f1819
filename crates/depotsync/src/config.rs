//! Runtime configuration, read from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use depotsync_fetch::{EndpointTemplate, MirrorSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pipeline::EntryFailurePolicy;

pub const DEFAULT_CONFIG_FILE: &str = "depotsync.toml";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_REPOSITORIES: &[&str] = &["SteamAutoCracks/ManifestHub"];

const RESTRICTED_MIRRORS: &[&str] = &[
    "https://cdn.jsdmirror.com/gh/{repo}@{sha}/{path}",
    "https://raw.gitmirror.com/{repo}/{sha}/{path}",
    "https://raw.dgithub.xyz/{repo}/{sha}/{path}",
    "https://gh.akass.cn/{repo}/{sha}/{path}",
];

const GLOBAL_MIRRORS: &[&str] = &[
    "https://raw.githubusercontent.com/{repo}/{sha}/{path}",
    "https://cdn.jsdelivr.net/gh/{repo}@{sha}/{path}",
];

fn templates(raw: &[&str]) -> Vec<EndpointTemplate> {
    raw.iter()
        .filter_map(|t| EndpointTemplate::new(*t).ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Candidate repositories as `owner/name`, in evaluation order.
    pub repositories: Vec<String>,
    pub api_base: String,
    pub storage_dir: PathBuf,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_rounds: u32,
    pub failure_policy: EntryFailurePolicy,
    pub mirrors: MirrorSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: DEFAULT_REPOSITORIES.iter().map(|s| s.to_string()).collect(),
            api_base: "https://api.github.com".to_string(),
            storage_dir: PathBuf::from("manifests"),
            token: None,
            timeout_secs: 30,
            max_rounds: depotsync_fetch::MirrorPolicy::DEFAULT_ROUNDS,
            failure_policy: EntryFailurePolicy::default(),
            mirrors: MirrorSet {
                restricted: templates(RESTRICTED_MIRRORS),
                global: templates(GLOBAL_MIRRORS),
            },
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or `depotsync.toml` in the working directory when present,
    /// or the defaults. A token in the environment wins over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };

        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            config.token = Some(token.trim().to_string());
        }

        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let bytes = depotsync_fs::atomic_read(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::Config(format!("{} is not valid UTF-8", path.display())))?;
        Self::from_toml(&text, path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repositories.is_empty() {
            return Err(Error::Config("at least one candidate repository is required".into()));
        }
        if let Some(bad) = self.repositories.iter().find(|r| !is_repo_name(r)) {
            return Err(Error::Config(format!(
                "repository {bad:?} is not in owner/name form"
            )));
        }
        if self.max_rounds == 0 {
            return Err(Error::Config("max_rounds must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".into()));
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(Error::Config(format!(
                "api_base {:?} is not an http(s) URL",
                self.api_base
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Headers sent to the hosting API only.
    pub fn api_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(
            "Accept".to_string(),
            "application/vnd.github+json".to_string(),
        )];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}

fn is_repo_name(repo: &str) -> bool {
    match repo.split_once('/') {
        Some((owner, name)) => {
            !owner.is_empty() && !name.is_empty() && !name.contains('/') && !repo.contains(char::is_whitespace)
        }
        None => false,
    }
}

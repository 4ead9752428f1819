//! Manifest file naming and per-depot aggregation.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::ids::NumericId;

pub const MANIFEST_SUFFIX: &str = ".manifest";
pub const KEY_FILE_MARKER: &str = "key.vdf";

static MANIFEST_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<depot>[0-9]+)_(?<manifest>[0-9]+)\.manifest$").expect("manifest name pattern")
});

/// How a tree path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Manifest,
    KeyFile,
    Ignored,
}

impl EntryKind {
    pub fn classify(path: &str) -> Self {
        if path.ends_with(MANIFEST_SUFFIX) {
            Self::Manifest
        } else if path.to_lowercase().contains(KEY_FILE_MARKER) {
            Self::KeyFile
        } else {
            Self::Ignored
        }
    }
}

/// `(depot, manifest)` parsed from `<depot>_<manifest>.manifest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestName {
    pub depot: NumericId,
    pub manifest: NumericId,
}

impl ManifestName {
    /// Parse the final path segment. Anything off-convention yields `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let caps = MANIFEST_NAME.captures(file_name)?;
        Some(Self {
            depot: NumericId::new(&caps["depot"]).ok()?,
            manifest: NumericId::new(&caps["manifest"]).ok()?,
        })
    }
}

/// Depot id to manifest ids, newest (largest) manifest first once sorted.
///
/// Duplicate names listed twice by a tree are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DepotMap(BTreeMap<NumericId, Vec<NumericId>>);

impl DepotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: ManifestName) {
        self.0.entry(name.depot).or_default().push(name.manifest);
    }

    /// Order every depot's manifests by descending numeric value.
    pub fn sort_descending(&mut self) {
        for manifests in self.0.values_mut() {
            manifests.sort_by(|a, b| b.cmp(a));
        }
    }

    pub fn get(&self, depot: &str) -> Option<&[NumericId]> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == depot)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NumericId, &[NumericId])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ManifestName> for DepotMap {
    fn from_iter<I: IntoIterator<Item = ManifestName>>(iter: I) -> Self {
        let mut map = Self::new();
        for name in iter {
            map.push(name);
        }
        map.sort_descending();
        map
    }
}

//! Local manifest storage rooted at one directory.

use std::path::{Component, Path, PathBuf};

use depotsync_fs::{AtomicWriteOptions, atomic_write, clear_files, ensure_dir, file_len};

use crate::error::Result;

/// Files are addressed by their repository tree path.
///
/// Two runs must not share a root concurrently: the existence check and the
/// rename into place are not one atomic step.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<()> {
        ensure_dir(&self.root)?;
        Ok(())
    }

    /// Where `tree_path` lives locally; `None` for paths that would escape the root.
    pub fn destination(&self, tree_path: &str) -> Option<PathBuf> {
        let relative = Path::new(tree_path);
        let safe = !tree_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.root.join(relative))
    }

    pub fn exists(&self, destination: &Path) -> Result<bool> {
        Ok(file_len(destination)?.is_some())
    }

    pub fn len(&self, destination: &Path) -> Result<Option<u64>> {
        Ok(file_len(destination)?)
    }

    pub fn write(&self, destination: &Path, content: &[u8]) -> Result<()> {
        atomic_write(
            destination,
            content,
            AtomicWriteOptions::new().create_parents(true).sync(true),
        )?;
        Ok(())
    }

    /// Remove the files directly under the root. Returns how many went.
    pub fn clear(&self) -> Result<usize> {
        Ok(clear_files(&self.root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_destination_rejects_escapes() {
        let store = ManifestStore::new("/data/manifests");
        assert_eq!(
            store.destination("1_2.manifest"),
            Some(PathBuf::from("/data/manifests/1_2.manifest"))
        );
        assert_eq!(
            store.destination("depots/1_2.manifest"),
            Some(PathBuf::from("/data/manifests/depots/1_2.manifest"))
        );
        assert_eq!(store.destination("../1_2.manifest"), None);
        assert_eq!(store.destination("a/../../1_2.manifest"), None);
        assert_eq!(store.destination("/etc/1_2.manifest"), None);
        assert_eq!(store.destination(""), None);
    }

    #[test]
    fn test_write_exists_len() {
        let dir = tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("m"));
        store.ensure().unwrap();

        let dest = store.destination("sub/1_2.manifest").unwrap();
        assert!(!store.exists(&dest).unwrap());

        store.write(&dest, b"abc").unwrap();

        assert!(store.exists(&dest).unwrap());
        assert_eq!(store.len(&dest).unwrap(), Some(3));
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = ManifestStore::new(dir.path());
        store.write(&store.destination("1_1.manifest").unwrap(), b"a").unwrap();
        store.write(&store.destination("1_2.manifest").unwrap(), b"b").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(!store.exists(&store.destination("1_1.manifest").unwrap()).unwrap());
    }
}

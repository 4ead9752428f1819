use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

const TMP_SUFFIX: &str = ".depotsync";

#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicWriteOptions {
    pub create_parents: bool,
    pub sync: bool,
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_parents(mut self, create_parents: bool) -> Self {
        self.create_parents = create_parents;
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

fn tmp_path_for(parent: &Path) -> PathBuf {
    parent.join(format!(".tmp.{}{}", uuid::Uuid::new_v4(), TMP_SUFFIX))
}

/// Write `content` to `path` through a temp file in the same directory.
///
/// The temp file is removed if the final rename fails.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| Error::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other("no parent directory"),
    })?;

    if options.create_parents && !parent.as_os_str().is_empty() {
        crate::ensure_dir(parent)?;
    }

    let tmp_path = tmp_path_for(parent);

    fs::write(&tmp_path, content).map_err(|e| Error::Write {
        path: tmp_path.clone(),
        source: e,
    })?;

    if options.sync {
        let synced = fs::File::open(&tmp_path).and_then(|file| file.sync_all());
        if let Err(e) = synced {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Write {
                path: tmp_path,
                source: e,
            });
        }
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::Write {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

pub fn atomic_read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1000_50.manifest");
        atomic_write(&path, b"hello world", AtomicWriteOptions::new()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        atomic_write(&path, b"data", AtomicWriteOptions::new().sync(true)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["out.bin".to_string()]);
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/file.manifest");
        atomic_write(&path, b"x", AtomicWriteOptions::new().create_parents(true)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }

    #[test]
    fn test_atomic_write_missing_parent_without_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/file.manifest");
        let err = atomic_write(&path, b"x", AtomicWriteOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_atomic_read_not_found() {
        let dir = tempdir().unwrap();
        let err = atomic_read(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

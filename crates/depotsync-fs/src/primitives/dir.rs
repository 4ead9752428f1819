use crate::{Error, Result};
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| Error::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Size in bytes of the regular file at `path`, `None` if nothing is there.
pub fn file_len(path: impl AsRef<Path>) -> Result<Option<u64>> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Remove every regular file directly inside `dir`. Subdirectories are kept.
///
/// Returns the number of files removed. A missing directory removes nothing.
pub fn clear_files(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(Error::Read {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| Error::Read {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| Error::Remove { path, source: e })?;
            removed += 1;
        }
    }
    Ok(removed)
}

//! Atomic file placement for downloaded artifacts.
//!
//! Writes land in a hidden sibling temp file first and are renamed over the
//! destination, so a reader never observes a half-written manifest.

mod error;
mod primitives;

pub use error::{Error, Result};
pub use primitives::{
    AtomicWriteOptions, atomic_read, atomic_write, clear_files, ensure_dir, file_len,
};

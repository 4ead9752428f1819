pub mod dir;
pub mod rw;

pub use dir::{clear_files, ensure_dir, file_len};
pub use rw::{AtomicWriteOptions, atomic_read, atomic_write};

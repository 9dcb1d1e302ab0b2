//! Filesystem access for `APPLY`, `INCLUDEFILE`, and image references.

use std::io;
use std::path::Path;

/// Reads files referenced from a document.
///
/// Every reference is read at the point it appears; implementations should
/// not cache.
pub trait FileSource {
    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileSource for LocalFiles {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

//! File store — loading and saving documents.
//!
//! The editor never touches the filesystem directly; it goes through a
//! [`FileStore`]. [`FsStore`] is the real one. [`MemStore`] keeps files in
//! memory and can be told to fail writes, which is how save errors are
//! tested.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where documents come from and go to.
pub trait FileStore {
    /// Read `path` as lines with their terminators (`\n`, or `\r\n`)
    /// stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn read_lines(&mut self, path: &Path) -> io::Result<Vec<Vec<u8>>>;

    /// Replace the contents of `path` with `bytes`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, truncated, or written.
    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Split file contents into lines without terminators.
///
/// A final line without a terminator still counts; a trailing terminator
/// does not start an extra empty line.
#[must_use]
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    data.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

// ─── FsStore ───────────────────────────────────────────────────────────────

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read_lines(&mut self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        let data = fs::read(path)?;
        Ok(split_lines(&data))
    }

    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        // Truncate to the new length first so a short write never leaves
        // stale bytes from a longer old version past the end.
        file.set_len(bytes.len() as u64)?;
        file.write_all(bytes)?;
        file.flush()
    }
}

// ─── MemStore ──────────────────────────────────────────────────────────────

/// Files in a hash map.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    files: HashMap<PathBuf, Vec<u8>>,
    fail_writes: bool,
}

impl MemStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        self.files.insert(path.into(), bytes.to_vec());
        self
    }

    /// Make every subsequent write fail (or succeed again).
    pub const fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Current contents of `path`.
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }
}

impl FileStore for MemStore {
    fn read_lines(&mut self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        self.files
            .get(path)
            .map(|data| split_lines(data))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_lines_strips_terminators() {
        assert_eq!(
            split_lines(b"a\r\nb\nc\n"),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn split_lines_keeps_unterminated_last_line() {
        assert_eq!(split_lines(b"a\nb"), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn split_lines_keeps_blank_lines() {
        assert_eq!(
            split_lines(b"\n\nx\n"),
            vec![Vec::new(), Vec::new(), b"x".to_vec()]
        );
    }

    #[test]
    fn split_lines_empty_file() {
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn split_lines_lone_newline_is_one_blank_line() {
        assert_eq!(split_lines(b"\n"), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn fs_round_trip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let original = b"ab\tc\n\nlast\n";
        fs::write(&path, original).unwrap();

        let mut store = FsStore;
        let doc = Document::from_lines(store.read_lines(&path).unwrap(), 8);
        assert_eq!(doc.len(), 3);
        store.write_all(&path, &doc.to_persisted_bytes()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), original.to_vec());
    }

    #[test]
    fn fs_write_truncates_longer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, b"a much longer previous version\n").unwrap();

        FsStore.write_all(&path, b"short\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short\n".to_vec());
    }

    #[test]
    fn fs_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        FsStore.write_all(&path, b"x\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x\n".to_vec());
    }

    #[test]
    fn fs_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsStore.read_lines(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn mem_store_read_write() {
        let mut store = MemStore::new().with_file("a.txt", b"1\n2\n");
        assert_eq!(
            store.read_lines(Path::new("a.txt")).unwrap(),
            vec![b"1".to_vec(), b"2".to_vec()]
        );
        store.write_all(Path::new("b.txt"), b"z\n").unwrap();
        assert_eq!(store.file("b.txt"), Some(&b"z\n"[..]));
        assert!(store.read_lines(Path::new("missing")).is_err());
    }

    #[test]
    fn mem_store_failing_writes() {
        let mut store = MemStore::new();
        store.set_fail_writes(true);
        assert!(store.write_all(Path::new("a"), b"x").is_err());
        assert_eq!(store.file("a"), None);
    }
}

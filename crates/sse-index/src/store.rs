//! File access for the builder and search engine
//!
//! `LocalStore` is the real filesystem. `MemoryStore` keeps everything in a
//! map, which is handy for tests and for embedding the index in a process that
//! never touches disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sse_core::{SseError, SseResult};

/// Whole-file storage. Writes are not guaranteed to be atomic.
pub trait FileStore {
    /// Read a whole file. A missing file is [`SseError::NotFound`].
    fn read(&self, path: &Path) -> SseResult<Vec<u8>>;

    /// Create or replace a file.
    fn write(&self, path: &Path, bytes: &[u8]) -> SseResult<()>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir` (non-recursive), sorted.
    fn list_files(&self, dir: &Path) -> SseResult<Vec<PathBuf>>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl FileStore for LocalStore {
    fn read(&self, path: &Path) -> SseResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| SseError::io(path, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> SseResult<()> {
        std::fs::write(path, bytes).map_err(|e| SseError::io(path, e))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> SseResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| SseError::io(dir, e))? {
            let path = entry.map_err(|e| SseError::io(dir, e))?.path();
            // Follows symlinks, so a link to a regular file counts
            if path.is_file() {
                files.push(path);
            } else {
                tracing::debug!(path = %path.display(), "skipping non-regular entry");
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory store. Directories must be created before files are written
/// into them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_dir(&self, path: impl Into<PathBuf>) {
        lock(&self.dirs).insert(path.into());
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        lock(&self.files).remove(path)
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> SseResult<Vec<u8>> {
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| SseError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> SseResult<()> {
        let parent = path.parent().unwrap_or(Path::new(""));
        if !self.is_dir(parent) {
            return Err(SseError::NotFound(parent.to_path_buf()));
        }
        lock(&self.files).insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        lock(&self.dirs).contains(path)
    }

    fn list_files(&self, dir: &Path) -> SseResult<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(SseError::NotFound(dir.to_path_buf()));
        }
        Ok(lock(&self.files)
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_lists_only_regular_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"b").unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("nested/c.txt"), b"c").unwrap();

        let files = LocalStore.list_files(tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![tmp.path().join("a.txt"), tmp.path().join("b.txt")]
        );
    }

    #[test]
    fn local_read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = LocalStore.read(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, SseError::NotFound(_)));
    }

    #[test]
    fn local_write_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.bin");
        LocalStore.write(&path, b"\x00\x01").unwrap();
        assert_eq!(LocalStore.read(&path).unwrap(), b"\x00\x01");
        assert!(LocalStore.is_dir(tmp.path()));
        assert!(!LocalStore.is_dir(&path));
    }

    #[test]
    fn memory_requires_parent_dir() {
        let store = MemoryStore::new();
        assert!(store.write(Path::new("cipher/a.txt"), b"x").is_err());

        store.create_dir("cipher");
        store.write(Path::new("cipher/a.txt"), b"x").unwrap();
        assert_eq!(store.read(Path::new("cipher/a.txt")).unwrap(), b"x");
    }

    #[test]
    fn memory_lists_direct_children() {
        let store = MemoryStore::new();
        store.create_dir("plain");
        store.create_dir("plain/sub");
        store.write(Path::new("plain/b.txt"), b"b").unwrap();
        store.write(Path::new("plain/a.txt"), b"a").unwrap();
        store.write(Path::new("plain/sub/c.txt"), b"c").unwrap();

        let files = store.list_files(Path::new("plain")).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("plain/a.txt"), PathBuf::from("plain/b.txt")]
        );
        assert!(store.list_files(Path::new("missing")).is_err());
    }
}

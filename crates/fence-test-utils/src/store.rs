//! Store fixtures.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fence_store::{Error, FileKvStore, KeyValueStore, MemoryKvStore, Result};
use tempfile::TempDir;

/// A [`MemoryKvStore`] whose reads or writes can be made to fail.
///
/// Clones share both the data and the failure switches.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryKvStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        Self {
            inner: MemoryKvStore::with_entry(key, value),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The underlying data, bypassing failure injection.
    pub fn inner(&self) -> &MemoryKvStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::unavailable(format!("scripted read failure for {key}")));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::unavailable(format!("scripted write failure for {key}")));
        }
        self.inner.set(key, value)
    }
}

/// A [`FileKvStore`] rooted in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TempStore {
    dir: TempDir,
}

impl TempStore {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh store over the same directory, as a restarted app would open.
    pub fn open(&self) -> FileKvStore {
        FileKvStore::new(self.dir.path())
    }

    /// Write a raw blob under `key`, bypassing validation.
    pub fn write_raw(&self, key: &str, contents: &str) {
        std::fs::write(self.dir.path().join(format!("{key}.json")), contents).unwrap();
    }

    pub fn read_raw(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(format!("{key}.json"))).ok()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

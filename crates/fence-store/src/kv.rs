//! String-keyed blob storage

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::{Error, Result, io};

/// Synchronous key-value persistence of one serialized blob per key.
pub trait KeyValueStore {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Validate a key before it is used as a file name.
///
/// Keys must be non-empty and limited to ASCII alphanumerics, `-`, `_`
/// and `.`, and must not start with a dot.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('.') {
        return Err(invalid("key must not start with '.'"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("only ASCII letters, digits, '-', '_' and '.' are allowed"));
    }
    Ok(())
}

/// File-backed store: each key lives in `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        io::read_optional(&path)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "Writing store key");
        io::write_atomic(&path, value.as_bytes())
    }
}

/// In-memory store.
///
/// Clones share the same map, so a caller can keep a handle to inspect what
/// another owner has written.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with a single key.
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.inner.lock() {
            map.insert(key.to_string(), value.into());
        }
        store
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .inner
            .lock()
            .map_err(|_| Error::unavailable("memory store lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| Error::unavailable("memory store lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

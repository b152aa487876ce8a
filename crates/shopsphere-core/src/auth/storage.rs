//! Key-value storage backends for the session store.
//!
//! The console keeps its credentials in two scopes: a persistent one that
//! survives restarts and a session one that lives only as long as the
//! process. Both are reached through [`KeyValueStore`], so the session store
//! can be exercised without touching the disk or the OS keychain.
//!
//! Storage is infallible by contract. Backends that can fail (disk, keychain)
//! log the failure and carry on.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

/// Keyring service name used by [`KeyringStore`]
const KEYRING_SERVICE: &str = "shopsphere-admin";

/// Owner read/write only
#[cfg(unix)]
const STORAGE_FILE_MODE: u32 = 0o600;

/// Which storage scope a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Survives restarts.
    Persistent,
    /// Discarded when the process (or tab) goes away.
    Session,
}

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned map is still a valid map
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local storage. The default session-scope backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Persistent storage backed by a single JSON object on disk.
///
/// The whole map is kept in memory and rewritten on every mutation; the file
/// only ever holds a handful of short strings. It holds bearer tokens, so on
/// Unix it is readable by the owner only (mode 0600).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file {}", path.display()))?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse storage file {}", path.display()))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Err(e) = Self::write(&self.path, entries) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist storage file");
        }
    }

    fn write(path: &Path, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(STORAGE_FILE_MODE);
        let mut file = options.open(path)?;

        // mode() only applies on creation; tighten files left by older runs
        #[cfg(unix)]
        file.set_permissions(std::fs::Permissions::from_mode(STORAGE_FILE_MODE))?;

        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Persistent storage in the OS keychain, one entry per key.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Option<Entry> {
        match Entry::new(&self.service, key) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to create keyring entry");
                None
            }
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entry(key)?.get_password().ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(entry) = self.entry(key) {
            if let Err(e) = entry.set_password(value) {
                warn!(key = key, error = %e, "Failed to store value in keychain");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(entry) = self.entry(key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => debug!(key = key, error = %e, "Failed to delete keychain entry"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("accessToken"), None);

        store.set("accessToken", "abc");
        assert_eq!(store.get("accessToken").as_deref(), Some("abc"));
        assert_eq!(store.len(), 1);

        store.set("accessToken", "def");
        assert_eq!(store.get("accessToken").as_deref(), Some("def"));

        store.remove("accessToken");
        assert!(store.is_empty());
        // Removing twice is a no-op
        store.remove("accessToken");
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).expect("open");
        store.set("adminUsername", "alice");
        store.set("accessToken", "A");
        store.remove("accessToken");
        assert!(path.exists());

        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("adminUsername").as_deref(), Some("alice"));
        assert_eq!(reopened.get("accessToken"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path).expect("open");
        store.set("accessToken", "A");
        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{}").expect("write");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
            .expect("chmod");

        let store = FileStore::open(&path).expect("open");
        store.set("refreshToken", "R");
        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            FileStore::open(&path).expect("reopen").get("refreshToken").as_deref(),
            Some("R")
        );
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").expect("write");

        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn test_file_store_empty_file_is_empty_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").expect("write");

        let store = FileStore::open(&path).expect("open");
        assert_eq!(store.get("accessToken"), None);
    }
}

//! Key-value storage seams for the two browser-style stores.
//!
//! The crate never reads structured values out of these stores; it only
//! enumerates keys and deletes by name during cleanup. The provider SDK is
//! the other writer.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Error raised by a storage backend.
///
/// Cleanup swallows these (best-effort semantics); other callers may
/// propagate them via [`AuthError::Storage`](crate::AuthError::Storage).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.0)
    }
}

impl std::error::Error for StorageError {}

/// An enumerable string key-value store.
///
/// Models `localStorage`/`sessionStorage`: synchronous, keyed by string,
/// enumerable. Implementations must be safe to share across tasks.
pub trait KeyStorage: Send + Sync {
    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is a no-op, not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// The persistent store plus the optional session-scoped store.
///
/// Session-scoped storage is unavailable in some execution environments;
/// cleanup must tolerate `session == None` without failing.
#[derive(Clone)]
pub struct StoragePair {
    pub persistent: Arc<dyn KeyStorage>,
    pub session: Option<Arc<dyn KeyStorage>>,
}

impl StoragePair {
    pub fn new(persistent: Arc<dyn KeyStorage>, session: Option<Arc<dyn KeyStorage>>) -> Self {
        Self {
            persistent,
            session,
        }
    }
}

/// In-memory `KeyStorage`, used by tests and headless deployments.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail: Arc<RwLock<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, for exercising the
    /// best-effort cleanup path.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut guard) = self.fail.write() {
            *guard = failing;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fail(&self) -> Result<(), StorageError> {
        let failing = self.fail.read().map(|f| *f).unwrap_or(false);
        if failing {
            Err(StorageError("storage unavailable".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl KeyStorage for MemoryStorage {
    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check_fail()?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError("lock poisoned".to_owned()))?;
        Ok(entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_fail()?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError("lock poisoned".to_owned()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_fail()?;
        self.entries
            .write()
            .map_err(|_| StorageError("lock poisoned".to_owned()))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_fail()?;
        self.entries
            .write()
            .map_err(|_| StorageError("lock poisoned".to_owned()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set("auth_token", "abc").unwrap();

        assert_eq!(storage.get("auth_token").unwrap(), Some("abc".to_owned()));
        assert_eq!(storage.keys().unwrap(), vec!["auth_token".to_owned()]);

        storage.remove("auth_token").unwrap();
        assert_eq!(storage.get("auth_token").unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("nope").is_ok());
    }

    #[test]
    fn test_failing_storage() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();

        storage.set_failing(true);
        assert!(storage.keys().is_err());
        assert!(storage.remove("k").is_err());

        storage.set_failing(false);
        assert_eq!(storage.get("k").unwrap(), Some("v".to_owned()));
    }
}

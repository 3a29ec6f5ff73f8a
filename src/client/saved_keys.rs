use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use super::lock;

/// Registry of durable-storage keys the application owns.
///
/// Whichever store introduces a persisted key registers it here. Logout
/// removes exactly these keys from storage and nothing else. Clones share the
/// same registry.
#[derive(Debug, Clone, Default)]
pub struct SavedKeys {
    keys: Arc<Mutex<BTreeSet<String>>>,
}

impl SavedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `false` if it was already registered.
    pub fn register(&self, key: impl Into<String>) -> bool {
        lock(&self.keys).insert(key.into())
    }

    /// Release `key`. Returns `false` if it was not registered.
    pub fn unregister(&self, key: &str) -> bool {
        lock(&self.keys).remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.keys).contains(key)
    }

    /// Snapshot of the registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        lock(&self.keys).iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.keys).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.keys).is_empty()
    }
}

impl<K: Into<String>> FromIterator<K> for SavedKeys {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let keys = SavedKeys::new();
        for key in iter {
            keys.register(key);
        }
        keys
    }
}

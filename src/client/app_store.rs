use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::observable::{Observable, Subscription};
use super::saved_keys::SavedKeys;
use super::session::SESSION_STORAGE_KEY;
use super::storage::DurableStorage;
use crate::error::Error;

/// Storage key holding the JSON array of keys the app store owns.
pub const APP_KEYS_STORAGE_KEY: &str = "appKeys";

/// Application state: persisted JSON values by storage key.
pub type AppState = BTreeMap<String, serde_json::Value>;

/// Generic application store.
///
/// Every key saved through it is persisted and registered in the
/// [`SavedKeys`] registry, so logout can sweep it. The list of owned keys is
/// itself persisted under [`APP_KEYS_STORAGE_KEY`] and re-registered when the
/// store is rebuilt over the same storage.
#[derive(Clone)]
pub struct AppStore {
    storage: Arc<dyn DurableStorage>,
    saved_keys: SavedKeys,
    state: Observable<AppState>,
}

impl AppStore {
    /// Create the store, restoring values saved in an earlier page life and
    /// registering their keys in `saved_keys`.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>, saved_keys: SavedKeys) -> Self {
        saved_keys.register(APP_KEYS_STORAGE_KEY);

        let mut state = AppState::new();
        for key in owned_keys(storage.as_ref()) {
            match storage.get(&key) {
                Ok(Some(raw)) => match serde_json::from_str(&raw) {
                    Ok(value) => {
                        state.insert(key.clone(), value);
                    }
                    Err(e) => tracing::debug!(error = %e, key = %key, "Ignoring malformed app value"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, key = %key, "App value unreadable"),
            }
            saved_keys.register(key);
        }

        Self {
            storage,
            saved_keys,
            state: Observable::new(state),
        }
    }

    /// Persist `value` under `key` and publish it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] for the reserved keys [`SESSION_STORAGE_KEY`]
    /// and [`APP_KEYS_STORAGE_KEY`], [`Error::Json`] if `value` does not
    /// serialize, or the storage error if persisting fails. The state is
    /// unchanged in all cases.
    pub fn save<V: Serialize>(&self, key: &str, value: &V) -> Result<(), Error> {
        if key == SESSION_STORAGE_KEY || key == APP_KEYS_STORAGE_KEY {
            return Err(Error::Storage(format!("`{key}` is a reserved storage key")));
        }
        let value = serde_json::to_value(value)?;
        let raw = serde_json::to_string(&value)?;

        self.state.try_update(|current| -> Result<_, Error> {
            let mut keys = owned_keys(self.storage.as_ref());
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_owned());
                self.storage
                    .set(APP_KEYS_STORAGE_KEY, &serde_json::to_string(&keys)?)?;
            }
            self.storage.set(key, &raw)?;
            self.saved_keys.register(key);
            let mut next = current.clone();
            next.insert(key.to_owned(), value);
            Ok(next)
        })
    }

    /// Current value under `key`, if it deserializes as `V`.
    #[must_use]
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let value = self.state.get().remove(key)?;
        serde_json::from_value(value).ok()
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.get()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&AppState) + Send + Sync + 'static,
    ) -> Subscription<AppState> {
        self.state.subscribe(listener)
    }

    /// Drop all in-memory state back to the empty baseline.
    pub fn reset(&self) {
        self.state.set(AppState::new());
    }
}

// Keys listed under `appKeys`; a missing or unreadable list is empty.
fn owned_keys(storage: &dyn DurableStorage) -> Vec<String> {
    match storage.get(APP_KEYS_STORAGE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring malformed app key list");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "App key list unreadable");
            Vec::new()
        }
    }
}

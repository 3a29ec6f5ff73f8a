use std::sync::Arc;

use super::observable::{Observable, Subscription};
use super::storage::DurableStorage;
use crate::error::Error;
use crate::types::IdentityRecord;

/// Durable-storage key holding the mirrored identity.
pub const SESSION_STORAGE_KEY: &str = "user";

/// Client-side mirror of the signed-in user.
///
/// Whenever the value is `Some`, its JSON sits in storage under
/// [`SESSION_STORAGE_KEY`]; whenever it is `None`, that entry is absent.
/// Writes go through [`set`](Self::set) only, which persists before the new
/// value becomes visible to subscribers.
#[derive(Clone)]
pub struct SessionMirror {
    storage: Arc<dyn DurableStorage>,
    value: Observable<Option<IdentityRecord>>,
}

impl SessionMirror {
    /// Create the mirror, hydrating from storage.
    ///
    /// A missing or unreadable entry gives `None`. An unreadable entry is
    /// also removed so storage and memory agree from the start.
    #[must_use]
    pub fn hydrate(storage: Arc<dyn DurableStorage>) -> Self {
        let initial = read_persisted(storage.as_ref());
        Self {
            storage,
            value: Observable::new(initial),
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<IdentityRecord> {
        self.value.get()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.get().is_some()
    }

    /// Replace the mirrored identity.
    ///
    /// # Errors
    ///
    /// Returns the storage error if persisting fails. The mirrored value is
    /// left unchanged in that case and subscribers are not notified.
    pub fn set(&self, value: Option<IdentityRecord>) -> Result<(), Error> {
        let storage = self.storage.as_ref();
        self.value.try_update(|_| -> Result<_, Error> {
            match &value {
                Some(identity) => {
                    storage.set(SESSION_STORAGE_KEY, &serde_json::to_string(identity)?)?;
                }
                None => storage.remove(SESSION_STORAGE_KEY)?,
            }
            Ok(value)
        })
    }

    /// Replace the identity with `f(current)`.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn update(
        &self,
        f: impl FnOnce(Option<IdentityRecord>) -> Option<IdentityRecord>,
    ) -> Result<(), Error> {
        self.set(f(self.get()))
    }

    /// Listen for identity changes. Called immediately with the current value.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Option<IdentityRecord>) + Send + Sync + 'static,
    ) -> Subscription<Option<IdentityRecord>> {
        self.value.subscribe(listener)
    }
}

fn read_persisted(storage: &dyn DurableStorage) -> Option<IdentityRecord> {
    let raw = match storage.get(SESSION_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Session mirror storage unreadable");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding malformed session mirror entry");
            if let Err(e) = storage.remove(SESSION_STORAGE_KEY) {
                tracing::warn!(error = %e, "Failed to remove malformed session mirror entry");
            }
            None
        }
    }
}

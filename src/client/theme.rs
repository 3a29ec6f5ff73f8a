use std::sync::Arc;

use super::observable::{Observable, Subscription};
use super::saved_keys::SavedKeys;
use super::storage::DurableStorage;
use crate::error::Error;

pub const FOREGROUND_COLOR_KEY: &str = "foregroundColor";
pub const COMPLEMENTARY_COLOR_KEY: &str = "complementaryColor";

/// The two colour settings the theme exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeColor {
    Foreground,
    Complementary,
}

impl ThemeColor {
    /// Durable-storage key for this colour.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Foreground => FOREGROUND_COLOR_KEY,
            Self::Complementary => COMPLEMENTARY_COLOR_KEY,
        }
    }
}

/// Default colours the theme resets to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub foreground: String,
    pub complementary: String,
}

impl Default for ThemeSnapshot {
    fn default() -> Self {
        Self {
            foreground: "#1f2937".into(),
            complementary: "#f9fafb".into(),
        }
    }
}

impl ThemeSnapshot {
    fn get(&self, color: ThemeColor) -> &str {
        match color {
            ThemeColor::Foreground => &self.foreground,
            ThemeColor::Complementary => &self.complementary,
        }
    }
}

/// Theme colour settings, persisted per colour.
#[derive(Clone)]
pub struct ThemeStore {
    storage: Arc<dyn DurableStorage>,
    snapshot: ThemeSnapshot,
    foreground: Observable<String>,
    complementary: Observable<String>,
}

impl ThemeStore {
    /// Create the store, registering both colour keys in `saved_keys` and
    /// restoring any persisted colours.
    #[must_use]
    pub fn new(
        storage: Arc<dyn DurableStorage>,
        saved_keys: &SavedKeys,
        snapshot: ThemeSnapshot,
    ) -> Self {
        let restore = |color: ThemeColor| {
            saved_keys.register(color.storage_key());
            match storage.get(color.storage_key()) {
                Ok(Some(value)) => value,
                Ok(None) => snapshot.get(color).to_owned(),
                Err(e) => {
                    tracing::warn!(error = %e, key = color.storage_key(), "Theme colour unreadable");
                    snapshot.get(color).to_owned()
                }
            }
        };
        let foreground = Observable::new(restore(ThemeColor::Foreground));
        let complementary = Observable::new(restore(ThemeColor::Complementary));

        Self {
            storage,
            snapshot,
            foreground,
            complementary,
        }
    }

    fn slot(&self, color: ThemeColor) -> &Observable<String> {
        match color {
            ThemeColor::Foreground => &self.foreground,
            ThemeColor::Complementary => &self.complementary,
        }
    }

    #[must_use]
    pub fn get(&self, color: ThemeColor) -> String {
        self.slot(color).get()
    }

    /// Persist and apply a colour.
    ///
    /// # Errors
    ///
    /// Returns the storage error; the colour is unchanged in that case.
    pub fn set(&self, color: ThemeColor, value: impl Into<String>) -> Result<(), Error> {
        let value = value.into();
        self.slot(color).try_update(|_| -> Result<_, Error> {
            self.storage.set(color.storage_key(), &value)?;
            Ok(value)
        })
    }

    pub fn subscribe(
        &self,
        color: ThemeColor,
        listener: impl Fn(&String) + Send + Sync + 'static,
    ) -> Subscription<String> {
        self.slot(color).subscribe(listener)
    }

    #[must_use]
    pub fn snapshot(&self) -> &ThemeSnapshot {
        &self.snapshot
    }

    /// Restore both colours to the snapshot, foreground first.
    ///
    /// Only the in-memory values change; persisted entries are left to the
    /// saved-keys sweep.
    pub fn reset(&self) {
        self.foreground.set(self.snapshot.foreground.clone());
        self.complementary.set(self.snapshot.complementary.clone());
    }
}

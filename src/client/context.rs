use std::sync::Arc;

use super::app_store::AppStore;
use super::saved_keys::SavedKeys;
use super::session::SessionMirror;
use super::storage::DurableStorage;
use super::theme::{ThemeSnapshot, ThemeStore};
use crate::error::Error;
use crate::types::SessionData;

/// Everything the client keeps about the current visitor.
///
/// Build one per page life and pass it to whatever renders or logs out.
/// All stores share the same storage and saved-keys registry.
#[derive(Clone)]
pub struct ClientContext {
    storage: Arc<dyn DurableStorage>,
    saved_keys: SavedKeys,
    session: SessionMirror,
    theme: ThemeStore,
    app: AppStore,
}

impl ClientContext {
    /// Build the context with the default theme.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self::with_theme(storage, ThemeSnapshot::default())
    }

    /// Build the context, hydrating the session mirror and theme from storage.
    #[must_use]
    pub fn with_theme(storage: Arc<dyn DurableStorage>, theme: ThemeSnapshot) -> Self {
        let saved_keys = SavedKeys::new();
        let session = SessionMirror::hydrate(storage.clone());
        let theme = ThemeStore::new(storage.clone(), &saved_keys, theme);
        let app = AppStore::new(storage.clone(), saved_keys.clone());

        Self {
            storage,
            saved_keys,
            session,
            theme,
            app,
        }
    }

    /// Adopt the user the server rendered this page for.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the mirror cannot be persisted.
    pub fn hydrate_from_server(&self, data: &SessionData) -> Result<(), Error> {
        self.session.set(data.user.clone())
    }

    #[must_use]
    pub fn storage(&self) -> &dyn DurableStorage {
        self.storage.as_ref()
    }

    #[must_use]
    pub fn saved_keys(&self) -> &SavedKeys {
        &self.saved_keys
    }

    #[must_use]
    pub fn session(&self) -> &SessionMirror {
        &self.session
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    #[must_use]
    pub fn app(&self) -> &AppStore {
        &self.app
    }
}

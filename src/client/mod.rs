//! Client half of the session lifecycle.
//!
//! A [`ClientContext`] bundles durable storage with the stores built on it:
//! the [`SessionMirror`] of the signed-in user, the [`ThemeStore`], the
//! generic [`AppStore`], and the [`SavedKeys`] registry of storage keys the
//! application owns. [`logout`] tears all of it down.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oauth_cookie_session::client::{ClientContext, FileStorage, HttpLogoutEndpoint, logout};
//!
//! let ctx = ClientContext::new(Arc::new(FileStorage::open("storage.json")?));
//! ctx.hydrate_from_server(&session_data)?;
//!
//! let endpoint = HttpLogoutEndpoint::new("https://app.example.com/logout".parse()?);
//! logout(&ctx, &endpoint, &|path: &str| reload(path)).await;
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

mod app_store;
mod context;
mod logout;
mod observable;
mod saved_keys;
mod session;
mod storage;
mod theme;

pub use app_store::{APP_KEYS_STORAGE_KEY, AppState, AppStore};
pub use context::ClientContext;
pub use logout::{HttpLogoutEndpoint, LANDING_PATH, LogoutEndpoint, LogoutOutcome, Navigator, logout};
pub use observable::{Observable, Subscription};
pub use saved_keys::SavedKeys;
pub use session::{SESSION_STORAGE_KEY, SessionMirror};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};
pub use theme::{COMPLEMENTARY_COLOR_KEY, FOREGROUND_COLOR_KEY, ThemeColor, ThemeSnapshot, ThemeStore};

// Poisoned locks are recovered; a panicking listener leaves the stores usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

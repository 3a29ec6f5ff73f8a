use std::sync::Arc;

use axum::extract::FromRef;

use super::config::{AuthSettings, CookieSettings};
use crate::oauth::AuthClient;

/// Shared state for auth route handlers.
#[derive(Clone)]
pub(super) struct AuthState {
    pub(super) client: Arc<AuthClient>,
    pub(super) settings: AuthSettings,
}

// Lets the session extractors run on the auth router itself.
impl FromRef<AuthState> for CookieSettings {
    fn from_ref(state: &AuthState) -> Self {
        state.settings.cookie.clone()
    }
}

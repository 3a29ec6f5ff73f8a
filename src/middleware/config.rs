use url::Url;

use super::error::AuthError;
use crate::oauth::{AuthClient, OAuthConfig};

/// Session cookie settings.
///
/// Shared by the auth routes (which write the cookie) and the
/// [`SessionData`](crate::types::SessionData) / [`AuthUser`](super::AuthUser)
/// extractors (which read it). Make it reachable from your own router state
/// via `FromRef` to use the extractors outside [`session_routes`](super::session_routes).
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub(crate) name: String,
    pub(crate) ttl_days: i64,
    pub(crate) secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "user".into(),
            ttl_days: 7,
            secure: true,
        }
    }
}

impl CookieSettings {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }
}

/// Shared auth settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie: CookieSettings,
    pub(crate) callback_path: String,
    pub(crate) login_path: String,
    pub(crate) logout_path: String,
    pub(crate) login_redirect: String,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie: CookieSettings::default(),
            callback_path: "/oauth".into(),
            login_path: "/login".into(),
            logout_path: "/logout".into(),
            login_redirect: "/dashboard".into(),
        }
    }
}

/// Session authentication configuration.
///
/// Use [`from_env()`](SessionAuthConfig::from_env) for convention-based setup,
/// or [`new()`](SessionAuthConfig::new) with `with_*` methods for full control.
#[derive(Debug)]
pub struct SessionAuthConfig {
    pub(super) client: AuthClient,
    pub(super) settings: AuthSettings,
}

impl SessionAuthConfig {
    /// Create config with the required `AuthClient`.
    ///
    /// All optional fields use defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OAUTH_CLIENT_ID`: OAuth2 client ID
    /// - `OAUTH_CLIENT_SECRET`: OAuth2 client secret (server-only)
    /// - `OAUTH_REDIRECT_URI`: pre-registered callback URI (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `OAUTH_AUTH_URL`: Override authorization endpoint
    /// - `OAUTH_TOKEN_URL`: Override token endpoint
    /// - `OAUTH_USERINFO_URL`: Override userinfo endpoint
    /// - `OAUTH_SCOPES`: Comma-separated OAuth2 scopes
    /// - `DEV_AUTH`: Set to `"1"` or `"true"` to disable secure cookies
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AuthError::Config(format!("{key} is required")))
        };
        let parse_url = |key: &str, raw: String| {
            raw.parse::<Url>()
                .map_err(|e| AuthError::Config(format!("{key}: {e}")))
        };

        let client_id = required("OAUTH_CLIENT_ID")?;
        let client_secret = required("OAUTH_CLIENT_SECRET")?;
        let redirect_uri = parse_url("OAUTH_REDIRECT_URI", required("OAUTH_REDIRECT_URI")?)?;

        let mut config = OAuthConfig::new(client_id, client_secret, redirect_uri);

        if let Some(raw) = lookup("OAUTH_AUTH_URL") {
            config = config.with_auth_url(parse_url("OAUTH_AUTH_URL", raw)?);
        }
        if let Some(raw) = lookup("OAUTH_TOKEN_URL") {
            config = config.with_token_url(parse_url("OAUTH_TOKEN_URL", raw)?);
        }
        if let Some(raw) = lookup("OAUTH_USERINFO_URL") {
            config = config.with_userinfo_url(parse_url("OAUTH_USERINFO_URL", raw)?);
        }
        if let Some(scopes) = lookup("OAUTH_SCOPES") {
            config =
                config.with_scopes(scopes.split(',').map(|s| s.trim().to_string()).collect());
        }

        let dev_auth = matches!(lookup("DEV_AUTH").as_deref(), Some("1") | Some("true"));

        Ok(Self::new(AuthClient::new(config)).with_secure_cookies(!dev_auth))
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.cookie.name = name.into();
        self
    }

    #[must_use]
    pub fn with_cookie_ttl_days(mut self, days: i64) -> Self {
        self.settings.cookie.ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.cookie.secure = secure;
        self
    }

    #[must_use]
    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.settings.callback_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.settings.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

    /// Cookie settings, for wiring the extractors into another router's state.
    #[must_use]
    pub fn cookie_settings(&self) -> &CookieSettings {
        &self.settings.cookie
    }
}

use std::future::Future;

use url::Url;

use super::context::ClientContext;
use crate::error::Error;

/// Where the client lands after logout.
pub const LANDING_PATH: &str = "/";

/// Server-side session invalidation, as seen from the client.
pub trait LogoutEndpoint: Send + Sync {
    /// Ask the server to drop the session cookie.
    fn logout(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Full navigation (document reload), discarding all in-memory state.
pub trait Navigator {
    fn hard_navigate(&self, path: &str);
}

impl<F: Fn(&str)> Navigator for F {
    fn hard_navigate(&self, path: &str) {
        self(path)
    }
}

/// `POST`s to the server logout route.
#[derive(Debug, Clone)]
pub struct HttpLogoutEndpoint {
    url: Url,
    http: reqwest::Client,
}

impl HttpLogoutEndpoint {
    /// `url` is the full logout route, e.g. `https://app.example.com/logout`.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for cookie stores or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

impl LogoutEndpoint for HttpLogoutEndpoint {
    async fn logout(&self) -> Result<(), Error> {
        let response = self.http.post(self.url.clone()).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Logout {
                status: response.status().as_u16(),
            })
        }
    }
}

/// What [`logout`] managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// The server acknowledged the logout request.
    pub server_cleared: bool,
    /// The session mirror was cleared from storage.
    pub session_cleared: bool,
    /// Saved keys whose storage entries could not be removed.
    pub uncleared_keys: Vec<String>,
}

/// Tear down the session on both sides and navigate to [`LANDING_PATH`].
///
/// The server call is awaited but never gates the local cleanup: theme and
/// app stores are reset, every saved key is removed from storage, and the
/// session mirror is cleared regardless of how the request went. Running it
/// again is harmless.
pub async fn logout<E, N>(ctx: &ClientContext, endpoint: &E, navigator: &N) -> LogoutOutcome
where
    E: LogoutEndpoint,
    N: Navigator + ?Sized,
{
    let server_cleared = match endpoint.logout().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
            false
        }
    };

    ctx.theme().reset();
    ctx.app().reset();

    let mut uncleared_keys = Vec::new();
    for key in ctx.saved_keys().keys() {
        if let Err(e) = ctx.storage().remove(&key) {
            tracing::warn!(error = %e, key = %key, "Failed to remove saved key");
            uncleared_keys.push(key);
        }
    }

    let session_cleared = match ctx.session().set(None) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to clear session mirror");
            false
        }
    };

    tracing::info!(server_cleared, session_cleared, "Logged out");
    navigator.hard_navigate(LANDING_PATH);

    LogoutOutcome {
        server_cleared,
        session_cleared,
        uncleared_keys,
    }
}

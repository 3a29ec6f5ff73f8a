use std::sync::Arc;

use axum::Router;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;

use super::config::SessionAuthConfig;
use super::cookies;
use super::state::AuthState;

/// Create the session authentication router.
///
/// Mounts three routes (paths configurable on [`SessionAuthConfig`]):
/// - `GET /login`: redirect to the provider consent screen
/// - `GET /oauth?code=…`: exchange the code, set the `user` cookie, 303 to `/dashboard`
/// - `POST /logout`: expire the `user` cookie
pub fn session_routes(config: SessionAuthConfig) -> Router {
    let settings = config.settings;

    let router = Router::new()
        .route(&settings.login_path, get(login))
        .route(&settings.callback_path, get(oauth_callback))
        .route(&settings.logout_path, post(logout));

    router.with_state(AuthState {
        client: Arc::new(config.client),
        settings,
    })
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(State(state): State<AuthState>) -> Redirect {
    Redirect::to(&state.client.authorization_url())
}

// ── Callback ───────────────────────────────────────────────────────

/// Query parameters the provider may send back to the callback.
#[derive(Debug, Default)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

impl CallbackParams {
    // Parsed by hand so a malformed query still ends in the redirect.
    fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "code" if params.code.is_none() => params.code = Some(value.into_owned()),
                "error" if params.error.is_none() => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

async fn oauth_callback(
    State(state): State<AuthState>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> (CookieJar, Redirect) {
    let redirect = Redirect::to(&state.settings.login_redirect);
    let params = CallbackParams::parse(query.as_deref());

    if let Some(error) = &params.error {
        tracing::warn!(error = %error, "OAuth2 error from provider");
        return (jar, redirect);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth2 callback without authorization code");
        return (jar, redirect);
    };

    let identity = match state.client.fetch_identity(&code).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Error logging in with OAuth2 user");
            return (jar, redirect);
        }
    };

    match cookies::session_cookie(&state.settings.cookie, &identity) {
        Ok(cookie) => {
            tracing::info!(sub = %identity.sub, "OAuth2 login successful");
            (jar.add(cookie), redirect)
        }
        Err(e) => {
            tracing::error!(error = %e, "Session cookie encoding failed");
            (jar, redirect)
        }
    }
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let had_session = jar.get(&state.settings.cookie.name).is_some();
    let clear_cookie = cookies::clear_session_cookie(&state.settings.cookie);

    tracing::info!(had_session, "Session cookie cleared");

    // `add` rather than `remove`: the clearing cookie goes out even when the
    // request carried no session.
    (jar.add(clear_cookie), StatusCode::NO_CONTENT)
}

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::config::CookieSettings;
use super::cookies;
use super::error::AuthError;
use crate::types::{IdentityRecord, SessionData};

/// Read the session cookie and produce the bootstrap data for rendering.
///
/// Never fails: no cookie and an unreadable cookie both give `user: None`.
/// The cookie is left untouched.
#[must_use]
pub fn load_session(jar: &CookieJar, settings: &CookieSettings) -> SessionData {
    SessionData {
        user: cookies::read_identity(jar, settings),
    }
}

/// Session bootstrap as an Axum extractor.
///
/// ```rust,ignore
/// async fn layout(session: SessionData) -> Json<SessionData> {
///     Json(session)
/// }
/// ```
impl<S> FromRequestParts<S> for SessionData
where
    S: Send + Sync,
    CookieSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let settings = CookieSettings::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(load_session(&jar, &settings))
    }
}

/// Authenticated user extracted from the session cookie.
///
/// Returns `401 Unauthorized` if there is no readable session. Use
/// [`SessionData`] instead for pages that serve anonymous visitors too.
///
/// ```rust,ignore
/// async fn dashboard(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}", user.identity.name.as_deref().unwrap_or("stranger"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: IdentityRecord,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    CookieSettings: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionData { user } = SessionData::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        user.map(|identity| Self { identity })
            .ok_or(AuthError::Unauthenticated)
    }
}

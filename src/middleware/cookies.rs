use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::CookieSettings;
use crate::error::Error;
use crate::types::IdentityRecord;

/// Create the session cookie carrying the JSON-encoded identity.
///
/// The jar percent-encodes the value on the way out and decodes it on the
/// way back in, so the raw JSON is safe to store here.
pub(crate) fn session_cookie(
    settings: &CookieSettings,
    identity: &IdentityRecord,
) -> Result<Cookie<'static>, Error> {
    let value = serde_json::to_string(identity)?;

    Ok(Cookie::build((settings.name.clone(), value))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(settings.ttl_days))
        .build())
}

/// Create the expiring cookie that overwrites the session on logout.
pub(crate) fn clear_session_cookie(settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), ""))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Decode the identity from the session cookie.
///
/// Missing and malformed cookies both yield `None`.
pub(crate) fn read_identity(jar: &CookieJar, settings: &CookieSettings) -> Option<IdentityRecord> {
    let cookie = jar.get(&settings.name)?;
    match serde_json::from_str(cookie.value()) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, cookie = %settings.name, "Ignoring malformed session cookie");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> IdentityRecord {
        IdentityRecord::new("u1")
            .with_name("Ann")
            .with_given_name("Ann")
            .with_family_name("Lee")
            .with_picture("http://x/p.png")
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(&CookieSettings::default(), &ann()).unwrap();

        assert_eq!(cookie.name(), "user");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::weeks(1)));
    }

    #[test]
    fn session_cookie_value_is_identity_json() {
        let cookie = session_cookie(&CookieSettings::default(), &ann()).unwrap();
        let parsed: IdentityRecord = serde_json::from_str(cookie.value()).unwrap();
        assert_eq!(parsed, ann());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&CookieSettings::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn read_identity_round_trips_through_jar() {
        let settings = CookieSettings::default();
        let jar = CookieJar::new().add(session_cookie(&settings, &ann()).unwrap());
        assert_eq!(read_identity(&jar, &settings), Some(ann()));
    }

    #[test]
    fn read_identity_missing_cookie() {
        assert_eq!(read_identity(&CookieJar::new(), &CookieSettings::default()), None);
    }

    #[test]
    fn read_identity_malformed_values() {
        let settings = CookieSettings::default();
        for value in ["", "not-json", "{", "null", "[]", r#"{"name":"Ann"}"#, r#"{"sub":42}"#] {
            let jar = CookieJar::new().add(Cookie::new("user", value));
            assert_eq!(read_identity(&jar, &settings), None, "value {value:?}");
        }
    }
}

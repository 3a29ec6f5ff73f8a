//! End-to-end tests for the server half of the session lifecycle.
//!
//! The provider token and userinfo endpoints are mocked with wiremock; the
//! router is driven in-process with `tower::ServiceExt::oneshot`.

#![cfg(feature = "server")]

use axum::Router;
use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::routing::get;
use axum::{Json, response::IntoResponse};
use axum_extra::extract::cookie::Cookie;
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oauth_cookie_session::middleware::{AuthUser, SessionAuthConfig, session_routes};
use oauth_cookie_session::{AuthClient, IdentityRecord, OAuthConfig, SessionData};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ACCESS_TOKEN: &str = "ya29.test-access-token";

fn config_for(base_url: &str) -> SessionAuthConfig {
    let oauth = OAuthConfig::new(
        "test-client",
        "test-secret",
        "http://localhost:5173/oauth".parse().unwrap(),
    )
    .with_auth_url(format!("{base_url}/authorize").parse().unwrap())
    .with_token_url(format!("{base_url}/token").parse().unwrap())
    .with_userinfo_url(format!("{base_url}/userinfo").parse().unwrap());

    SessionAuthConfig::new(AuthClient::new(oauth))
}

async fn dashboard(session: SessionData) -> Json<SessionData> {
    Json(session)
}

async fn me(user: AuthUser) -> impl IntoResponse {
    Json(user.identity)
}

fn app(config: SessionAuthConfig) -> Router {
    let cookies = config.cookie_settings().clone();
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/me", get(me))
        .with_state(cookies)
        .merge(session_routes(config))
}

fn token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3599,
        "refresh_token": "1//test-refresh-token",
        "id_token": "eyJ.test.id-token",
        "scope": "openid email profile"
    })
}

fn userinfo_body() -> serde_json::Value {
    serde_json::json!({
        "sub": "u1",
        "name": "Ann",
        "given_name": "Ann",
        "family_name": "Lee",
        "picture": "http://x/p.png",
        "email": "a@x.com",
        "email_verified": true,
        "locale": "en"
    })
}

async fn mount_provider(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_secret=test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(userinfo_body()))
        .expect(1)
        .mount(server)
        .await;
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn assert_redirects_to_dashboard(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/dashboard");
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Callback: successful exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_successful_exchange_sets_allow_listed_cookie() {
    let server = MockServer::start().await;
    mount_provider(&server).await;
    let app = app(config_for(&server.uri()));

    let response = send(&app, get_request("/oauth?code=abc123", None)).await;

    assert_redirects_to_dashboard(&response);
    let headers = set_cookies(&response);
    assert_eq!(headers.len(), 1);

    let cookie = Cookie::parse_encoded(headers[0].clone()).unwrap();
    assert_eq!(cookie.name(), "user");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));

    let value: serde_json::Value = serde_json::from_str(cookie.value()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "sub": "u1",
            "name": "Ann",
            "given_name": "Ann",
            "family_name": "Lee",
            "picture": "http://x/p.png"
        })
    );

    assert!(!headers[0].contains("a%40x.com") && !headers[0].contains("a@x.com"));
    assert!(!headers[0].contains("test-access-token"));
    assert!(!headers[0].contains("test-refresh-token"));
}

#[tokio::test]
async fn test_session_cookie_is_read_back_by_loader() {
    let server = MockServer::start().await;
    mount_provider(&server).await;
    let app = app(config_for(&server.uri()));

    let login = send(&app, get_request("/oauth?code=abc123", None)).await;
    let set_cookie = set_cookies(&login).remove(0);
    let pair = set_cookie.split(';').next().unwrap().to_string();

    let response = send(&app, get_request("/dashboard", Some(&pair))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data: SessionData = json_body(response).await;
    let expected = IdentityRecord::new("u1")
        .with_name("Ann")
        .with_given_name("Ann")
        .with_family_name("Lee")
        .with_picture("http://x/p.png");
    assert_eq!(data.user, Some(expected));

    let me = send(&app, get_request("/me", Some(&pair))).await;
    assert_eq!(me.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Callback: failures still redirect, never set a cookie
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_invalid_code_redirects_without_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(userinfo_body()))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(config_for(&server.uri()));

    let response = send(&app, get_request("/oauth?code=expired", None)).await;

    assert_redirects_to_dashboard(&response);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_userinfo_failure_redirects_without_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app(config_for(&server.uri()));

    let response = send(&app, get_request("/oauth?code=abc123", None)).await;

    assert_redirects_to_dashboard(&response);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_userinfo_without_sub_redirects_without_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "Ann" })),
        )
        .mount(&server)
        .await;
    let app = app(config_for(&server.uri()));

    let response = send(&app, get_request("/oauth?code=abc123", None)).await;

    assert_redirects_to_dashboard(&response);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_unreachable_provider_redirects_without_cookie() {
    let app = app(config_for("http://127.0.0.1:9"));

    let response = send(&app, get_request("/oauth?code=abc123", None)).await;

    assert_redirects_to_dashboard(&response);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_missing_code_and_provider_error_skip_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(config_for(&server.uri()));

    for uri in ["/oauth", "/oauth?code=", "/oauth?error=access_denied&code=abc123"] {
        let response = send(&app, get_request(uri, None)).await;
        assert_redirects_to_dashboard(&response);
        assert!(set_cookies(&response).is_empty(), "uri {uri}");
    }
}

// ---------------------------------------------------------------------------
// Bootstrap loader
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_loader_without_cookie_yields_null_user() {
    let app = app(config_for("http://127.0.0.1:9"));

    let response = send(&app, get_request("/dashboard", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body, serde_json::json!({ "user": null }));
}

#[tokio::test]
async fn test_loader_with_malformed_cookies_yields_null_user() {
    let app = app(config_for("http://127.0.0.1:9"));

    for cookie in [
        "user=",
        "user=not-json",
        "user=%7Bbroken",
        "user=%5B%5D",
        "user=%7B%22name%22%3A%22Ann%22%7D",
        "user=%E0%A4%A",
    ] {
        let response = send(&app, get_request("/dashboard", Some(cookie))).await;
        assert_eq!(response.status(), StatusCode::OK, "cookie {cookie}");
        let data: SessionData = json_body(response).await;
        assert_eq!(data.user, None, "cookie {cookie}");
    }
}

#[tokio::test]
async fn test_auth_user_rejects_anonymous() {
    let app = app(config_for("http://127.0.0.1:9"));

    let response = send(&app, get_request("/me", Some("user=garbage"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Login and logout routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_redirects_to_consent_screen() {
    let server = MockServer::start().await;
    let app = app(config_for(&server.uri()));

    let response = send(&app, get_request("/login", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with(&format!("{}/authorize?", server.uri())));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("client_id=test-client"));
    assert!(location.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2Foauth"));
    assert!(!location.contains("test-secret"));
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = app(config_for("http://127.0.0.1:9"));

    for cookie in [Some("user=%7B%22sub%22%3A%22u1%22%7D"), None] {
        let mut builder = Request::builder().method(Method::POST).uri("/logout");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let response = send(&app, builder.body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = set_cookies(&response);
        assert_eq!(headers.len(), 1);
        let cleared = Cookie::parse_encoded(headers[0].clone()).unwrap();
        assert_eq!(cleared.name(), "user");
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.path(), Some("/"));
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    }
}

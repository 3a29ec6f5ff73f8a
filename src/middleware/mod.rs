//! Server half of the session lifecycle for Axum.
//!
//! Provides the OAuth2 callback that installs the `user` cookie, the logout
//! endpoint that expires it, and extractors that read it on every request.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oauth_cookie_session::SessionData;
//! use oauth_cookie_session::middleware::{SessionAuthConfig, session_routes};
//!
//! // 1. Configure from environment
//! let config = SessionAuthConfig::from_env()?;
//! let cookie_settings = config.cookie_settings().clone();
//!
//! // 2. Mount auth routes next to your pages
//! let app = axum::Router::new()
//!     .route("/dashboard", get(|session: SessionData| async move { Json(session) }))
//!     .with_state(cookie_settings)
//!     .merge(session_routes(config));
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;

pub use config::{CookieSettings, SessionAuthConfig};
pub use error::AuthError;
pub use extractor::{AuthUser, load_session};
pub use routes::session_routes;

/// Re-export cookie jar type for [`load_session`].
pub use axum_extra::extract::CookieJar;

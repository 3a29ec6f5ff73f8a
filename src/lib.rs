#![doc = include_str!("../README.md")]

pub mod client;
pub mod error;
#[cfg(feature = "server")]
pub mod middleware;
pub mod oauth;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
pub use oauth::{AuthClient, OAuthConfig, TokenResponse, UserInfo};
pub use types::{IdentityRecord, SessionData, Subject};

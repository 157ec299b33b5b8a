//! Backend abstraction layer over the hosted backend-as-a-service.
//!
//! This module defines the interface every backend implementation exposes to the
//! rest of the crate: authentication, row-level table access, stored procedures
//! and object storage. The portal never talks to the network any other way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod factory;
pub mod memory;
pub mod query;
pub mod supabase;

pub use memory::MemoryBackend;
pub use query::{Filter, FilterOp, Order, Query};
pub use supabase::SupabaseBackend;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

/// The authenticated user as reported by the auth service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// An auth session: bearer token plus the user it belongs to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as a unix timestamp in seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now.timestamp())
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

/// OAuth identity providers the portal offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// Build the auth service's authorize URL for an OAuth provider.
pub fn authorize_url(base_url: &str, provider: OAuthProvider, redirect_to: &str) -> Result<String, BackendError> {
    let endpoint = format!("{}/auth/v1/authorize", base_url.trim_end_matches('/'));
    reqwest::Url::parse_with_params(&endpoint, &[("provider", provider.as_str()), ("redirect_to", redirect_to)])
        .map(|url| url.to_string())
        .map_err(|e| BackendError::InvalidData(format!("invalid authorize URL '{endpoint}': {e}")))
}

/// Backend trait that the portal's data and auth layer is built on.
///
/// Table operations work on raw JSON rows; the repositories map them to the
/// typed entities. Filters passed to `update` and `delete` select the affected
/// rows exactly like they do for `select`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier (e.g., "supabase", "memory").
    fn backend_type(&self) -> &str;

    // Auth
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;
    /// Register an account. Returns a session when the account is usable
    /// immediately, `None` when email confirmation is pending.
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<Option<Session>, BackendError>;
    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String, BackendError>;
    async fn session(&self) -> Option<Session>;
    async fn set_session(&self, session: Option<Session>);
    async fn refresh_session(&self) -> Result<Session, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
    async fn update_password(&self, new_password: &str) -> Result<(), BackendError>;
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), BackendError>;

    // Tables
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, BackendError>;
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError>;
    async fn upsert(&self, table: &str, row: Value) -> Result<Value, BackendError>;
    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, BackendError>;
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), BackendError>;

    // Stored procedures
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError>;

    // Object storage
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), BackendError>;
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BackendError>;
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at,
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("a@gmail.com".to_string()),
                user_metadata: Value::Null,
            },
        }
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert!(!session(None).is_expired(now));
        assert!(!session(Some(now.timestamp() + 60)).is_expired(now));
        assert!(session(Some(now.timestamp())).is_expired(now));
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let url = authorize_url(
            "https://demo.supabase.co/",
            OAuthProvider::Google,
            "https://portal.example/user-dashboard",
        )
        .unwrap();
        assert!(url.starts_with("https://demo.supabase.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fportal.example%2Fuser-dashboard"));
    }
}

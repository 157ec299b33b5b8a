//! Sign-in, sign-up and session handling.
//!
//! [`AuthService`] wraps the backend's auth endpoints with the portal's rules:
//! the student email domain, blocked accounts, role-based landing pages and the
//! login counter. [`SessionStore`] keeps a session on disk between CLI runs.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{Backend, OAuthProvider, Session};
use crate::config::AuthConfig;
use crate::constants::RPC_INCREMENT_LOGIN_COUNT;
use crate::counters::{increment_counter, CounterUpdate};
use crate::entities::Profile;
use crate::error::ValidationError;
use crate::repositories::ProfileRepository;
use crate::routing::{Route, Viewer};

/// Result of a successful password sign-in.
#[derive(Clone, Debug)]
pub struct SignIn {
    pub session: Session,
    pub profile: Option<Profile>,
    /// Page to send the user to.
    pub route: Route,
    pub login_count: CounterUpdate,
}

/// Result of a successful sign-up.
#[derive(Clone, Debug)]
pub struct SignUp {
    pub session: Option<Session>,
    /// The account exists but cannot sign in until the email is confirmed.
    pub verification_pending: bool,
}

pub struct AuthService {
    backend: Arc<dyn Backend>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(backend: Arc<dyn Backend>, config: AuthConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Sign in with email and password.
    ///
    /// Blocked accounts are signed straight back out. A profile without an
    /// email gets the session's email copied onto it.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField { field: "Email" }.into());
        }

        let session = self.backend.sign_in_with_password(email, password).await?;
        let user_id = session.user_id().to_string();
        let mut profile = ProfileRepository::get_by_id(self.backend.as_ref(), &user_id)
            .await
            .context("Failed to load profile")?;

        if profile.as_ref().is_some_and(|p| p.blocked) {
            warn!("Blocked account {} tried to sign in", user_id);
            if let Err(e) = self.backend.sign_out().await {
                warn!("Sign-out after blocked sign-in failed: {}", e);
            }
            self.backend.set_session(None).await;
            return Err(ValidationError::Blocked.into());
        }

        if let Some(current) = profile.as_mut() {
            if current.email.as_deref().map_or(true, str::is_empty) {
                if let Some(updated) = self.sync_profile_email(&session).await {
                    *current = updated;
                }
            }
        }

        let login_count =
            increment_counter(self.backend.as_ref(), RPC_INCREMENT_LOGIN_COUNT, &user_id, "login_count").await;

        let viewer = Viewer::from_session(&session, profile.clone());
        let route = Route::home_for(viewer.is_admin(&self.config));
        info!("Signed in {} -> {}", user_id, route.path());

        Ok(SignIn {
            session,
            profile,
            route,
            login_count,
        })
    }

    /// Copy the session email onto the profile row. Failures are logged only.
    async fn sync_profile_email(&self, session: &Session) -> Option<Profile> {
        let email = session.email()?;
        match ProfileRepository::update(self.backend.as_ref(), session.user_id(), json!({ "email": email })).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Could not sync email for {}: {:#}", session.user_id(), e);
                None
            }
        }
    }

    /// Whether `email` may be used to create a student account.
    pub fn is_allowed_signup_email(&self, email: &str) -> bool {
        let email = email.trim();
        self.config.is_admin_email(email)
            || email
                .to_lowercase()
                .ends_with(&self.config.student_email_domain.to_lowercase())
    }

    /// Create an account. The profile row itself is created by the backend.
    pub async fn sign_up(&self, full_name: &str, email: &str, password: &str) -> Result<SignUp> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField { field: "Email" }.into());
        }
        if !self.is_allowed_signup_email(email) {
            return Err(ValidationError::SignupDomain {
                domain: self.config.student_email_domain.clone(),
            }
            .into());
        }

        let metadata = json!({ "full_name": full_name.trim(), "email": email });
        let session = self.backend.sign_up(email, password, metadata).await?;

        if let Some(session) = &session {
            self.sync_profile_email(session).await;
        }
        info!("Signed up {} (session: {})", email, session.is_some());

        Ok(SignUp {
            verification_pending: session.is_none(),
            session,
        })
    }

    /// Provider authorize URL; the provider sends the user back to the dashboard.
    pub fn oauth_url(&self, provider: OAuthProvider) -> Result<String> {
        let redirect_to = self.config.site_link(&self.config.oauth_redirect_path);
        Ok(self.backend.oauth_authorize_url(provider, &redirect_to)?)
    }

    /// The active session, refreshed first when it has expired.
    ///
    /// An expired session that cannot be refreshed is dropped.
    pub async fn current_session(&self) -> Option<Session> {
        let session = self.backend.session().await?;
        if !session.is_expired(Utc::now()) {
            return Some(session);
        }
        if session.refresh_token.is_none() {
            self.backend.set_session(None).await;
            return None;
        }
        match self.backend.refresh_session().await {
            Ok(refreshed) => Some(refreshed),
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                self.backend.set_session(None).await;
                None
            }
        }
    }

    pub async fn require_session(&self) -> Result<Session> {
        self.current_session()
            .await
            .ok_or_else(|| ValidationError::NotSignedIn.into())
    }

    /// Who is currently using the client, with their profile when it loads.
    pub async fn viewer(&self) -> Viewer {
        match self.current_session().await {
            Some(session) => {
                let profile = match ProfileRepository::get_by_id(self.backend.as_ref(), session.user_id()).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        warn!("Failed to load profile for {}: {:#}", session.user_id(), e);
                        None
                    }
                };
                Viewer::from_session(&session, profile)
            }
            None => Viewer::anonymous(),
        }
    }

    /// Sign out. The local session is dropped even when the backend call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.backend.sign_out().await;
        self.backend.set_session(None).await;
        result.context("Sign-out request failed")?;
        Ok(())
    }

    /// Email a password-reset link that lands on the reset page.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField { field: "Email" }.into());
        }
        let redirect_to = self.config.site_link(&self.config.reset_redirect_path);
        self.backend.send_password_reset(email, &redirect_to).await?;
        Ok(())
    }

    /// Check a new password against its confirmation and the minimum length.
    pub fn validate_new_password(&self, password: &str, confirm: &str) -> Result<(), ValidationError> {
        if password != confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(ValidationError::PasswordTooShort {
                min: self.config.min_password_length,
            });
        }
        Ok(())
    }

    pub async fn update_password(&self, password: &str, confirm: &str) -> Result<()> {
        self.validate_new_password(password, confirm)?;
        self.require_session().await?;
        self.backend.update_password(password).await?;
        Ok(())
    }
}

/// Session persisted as JSON between invocations.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data dir>/backbenchers/session.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("backbenchers").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file: {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Mirror the backend's current session on disk.
    pub async fn persist(&self, backend: &dyn Backend) -> Result<()> {
        match backend.session().await {
            Some(session) => self.save(&session),
            None => self.clear(),
        }
    }

    /// Hand a saved session to the backend, if there is one.
    pub async fn restore(&self, backend: &dyn Backend) -> Result<bool> {
        match self.load()? {
            Some(session) => {
                backend.set_session(Some(session)).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryBackend::new()), AuthConfig::default())
    }

    #[test]
    fn test_signup_domain_rule() {
        let auth = service();
        assert!(auth.is_allowed_signup_email("student@gmail.com"));
        assert!(auth.is_allowed_signup_email("Student@GMAIL.com"));
        assert!(auth.is_allowed_signup_email("schedule.manager4@gmail.com"));
        assert!(!auth.is_allowed_signup_email("student@poornima.org"));
        assert!(!auth.is_allowed_signup_email("gmail.com@evil.org"));
    }

    #[test]
    fn test_validate_new_password() {
        let auth = service();
        assert_eq!(
            auth.validate_new_password("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            auth.validate_new_password("abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(auth.validate_new_password("abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn test_session_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        let session: Session = serde_json::from_value(json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_at": 1_900_000_000,
            "user": {"id": "u1", "email": "a@gmail.com"}
        }))
        .unwrap();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}

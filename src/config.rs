//! Configuration management for Backbenchers
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    DEFAULT_ADMIN_EMAIL, DEFAULT_ANON_KEY_ENV, DEFAULT_AVATARS_BUCKET, DEFAULT_NOTES_BUCKET, DEFAULT_SITE_URL,
    DEFAULT_STUDENT_EMAIL_DOMAIN, DEFAULT_URL_ENV, MIN_PASSWORD_LENGTH,
};
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Hosted backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend type: "supabase" or "memory" (offline, nothing persisted)
    pub backend_type: String,
    /// Project URL; takes precedence over `url_env`
    pub url: Option<String>,
    /// Public anon key; takes precedence over `anon_key_env`
    pub anon_key: Option<String>,
    /// Environment variable holding the project URL
    pub url_env: String,
    /// Environment variable holding the anon key
    pub anon_key_env: String,
}

/// Resolved project URL and key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub url: String,
    pub anon_key: String,
}

/// Authentication and role rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Account that is always treated as an administrator
    pub admin_email: String,
    /// Domain student sign-ups must use (the admin email is exempt)
    pub student_email_domain: String,
    /// Public URL of the site, used to build OAuth and reset redirects
    pub site_url: String,
    /// Path OAuth sign-ins land on
    pub oauth_redirect_path: String,
    /// Path password-reset emails link to
    pub reset_redirect_path: String,
    pub min_password_length: usize,
}

/// Object storage buckets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub notes_bucket: String,
    pub avatars_bucket: String,
}

/// List sizes for the dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub recent_notes: usize,
    pub recent_courses: usize,
    /// Announcements shown on an admin's feed
    pub admin_announcements: usize,
    /// Upcoming reminders shown on a student's feed
    pub upcoming_reminders: usize,
    /// Announcements shown on the user dashboard
    pub dashboard_announcements: usize,
    pub recommendations: usize,
    pub recently_viewed: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write log lines to the log file (the in-memory buffer is always on)
    pub enabled: bool,
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: "supabase".to_string(),
            url: None,
            anon_key: None,
            url_env: DEFAULT_URL_ENV.to_string(),
            anon_key_env: DEFAULT_ANON_KEY_ENV.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            student_email_domain: DEFAULT_STUDENT_EMAIL_DOMAIN.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            oauth_redirect_path: "/user-dashboard".to_string(),
            reset_redirect_path: "/reset-password".to_string(),
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            notes_bucket: DEFAULT_NOTES_BUCKET.to_string(),
            avatars_bucket: DEFAULT_AVATARS_BUCKET.to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            recent_notes: 5,
            recent_courses: 4,
            admin_announcements: 2,
            upcoming_reminders: 3,
            dashboard_announcements: 3,
            recommendations: 3,
            recently_viewed: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl BackendConfig {
    /// Resolve the project URL and anon key from inline values or the environment.
    pub fn resolve_credentials(&self) -> Result<BackendCredentials> {
        let url = resolve_value(self.url.as_ref(), &self.url_env)
            .with_context(|| format!("Backend URL not configured: set backend.url or {}", self.url_env))?;
        let anon_key = resolve_value(self.anon_key.as_ref(), &self.anon_key_env)
            .with_context(|| format!("Backend key not configured: set backend.anon_key or {}", self.anon_key_env))?;
        Ok(BackendCredentials { url, anon_key })
    }
}

fn resolve_value(inline: Option<&String>, env_name: &str) -> Option<String> {
    inline
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .or_else(|| std::env::var(env_name).ok().filter(|value| !value.trim().is_empty()))
}

impl AuthConfig {
    /// Whether `email` is the configured administrator account.
    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.admin_email)
    }

    /// Absolute URL for a path on the site.
    pub fn site_link(&self, path: &str) -> String {
        format!("{}/{}", self.site_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        let current_dir_config = PathBuf::from("backbenchers.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("backbenchers").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.backend.backend_type.as_str() {
            "supabase" | "memory" => {}
            other => anyhow::bail!("backend_type must be 'supabase' or 'memory', got '{}'", other),
        }

        if self.auth.admin_email.trim().is_empty() {
            anyhow::bail!("admin_email cannot be empty");
        }
        if !self.auth.student_email_domain.starts_with('@') {
            anyhow::bail!(
                "student_email_domain must start with '@', got '{}'",
                self.auth.student_email_domain
            );
        }
        if self.auth.min_password_length < MIN_PASSWORD_LENGTH {
            anyhow::bail!(
                "min_password_length cannot be below {}, got {}",
                MIN_PASSWORD_LENGTH,
                self.auth.min_password_length
            );
        }

        let limits = [
            ("recent_notes", self.feed.recent_notes),
            ("recent_courses", self.feed.recent_courses),
            ("admin_announcements", self.feed.admin_announcements),
            ("upcoming_reminders", self.feed.upcoming_reminders),
            ("dashboard_announcements", self.feed.dashboard_announcements),
            ("recommendations", self.feed.recommendations),
            ("recently_viewed", self.feed.recently_viewed),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            anyhow::bail!("feed.{} must be at least 1", name);
        }

        if crate::logger::parse_level(&self.logging.level).is_none() {
            anyhow::bail!(
                "Invalid logging level '{}': expected trace|debug|info|warn|error",
                self.logging.level
            );
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# Backbenchers Configuration File\n# Generated on {}\n\n",
            datetime::format_today()
        );

        let full_content = header + &toml_content;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("backbenchers"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}

//! Portal services.
//!
//! Each service wraps one area of the portal and talks to the backend through
//! the repositories. The [`Portal`] bundles the shared pieces (backend,
//! configuration, toast queue) and hands out services and stores built on them.

pub mod admin;
pub mod courses;
pub mod dashboard;
pub mod notes;
pub mod profile;

use anyhow::Result;
use std::sync::Arc;

pub use admin::{AdminService, NoteUpload, UserEdit};
pub use courses::{Catalogue, CourseService};
pub use dashboard::{DashboardService, Feed, FeedPanel, UserDashboard};
pub use notes::{Download, NotesService};
pub use profile::{ProfileEdit, ProfileService};

use crate::auth::AuthService;
use crate::backend::{factory, Backend};
use crate::config::Config;
use crate::notifications::Notifier;
use crate::state::{BookmarkSet, ReminderList, TodoList};

/// Shared context for every service and store.
///
/// Cloning a `Portal` shares the backend, and with it the session, and the
/// toast queue.
///
/// # Example
/// ```rust,no_run
/// use backbenchers::config::Config;
/// use backbenchers::services::Portal;
///
/// # async fn example() -> anyhow::Result<()> {
/// let portal = Portal::from_config(Config::load()?)?;
/// portal.auth().sign_in("student@gmail.com", "secret1").await?;
///
/// let feed = portal.dashboard().feed(chrono::Utc::now()).await?;
/// println!("{} recent notes", feed.recent_notes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Portal {
    backend: Arc<dyn Backend>,
    config: Config,
    notifier: Notifier,
}

impl Portal {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        Self {
            backend,
            config,
            notifier: Notifier::new(),
        }
    }

    /// Build the backend named in the configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let backend = factory::create_backend(&config.backend)?;
        Ok(Self::new(backend, config))
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.backend(), self.config.auth.clone())
    }

    pub fn notes(&self) -> NotesService {
        NotesService::new(self.backend(), self.config.storage.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(
            self.backend(),
            self.config.auth.clone(),
            self.config.storage.clone(),
            self.notifier.clone(),
        )
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.backend(), self.config.auth.clone(), self.config.feed.clone())
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.backend(), self.config.storage.clone(), self.notifier.clone())
    }

    pub fn courses(&self) -> CourseService {
        CourseService::new(self.backend())
    }

    pub fn todos(&self, user_id: &str) -> TodoList {
        TodoList::new(self.backend(), self.notifier.clone(), user_id)
    }

    pub fn reminders(&self, user_id: &str) -> ReminderList {
        ReminderList::new(self.backend(), self.notifier.clone(), user_id)
    }

    pub fn bookmarks(&self, user_id: &str) -> BookmarkSet {
        BookmarkSet::new(self.backend(), self.notifier.clone(), user_id)
    }
}

/// Extension of an uploaded file name, lowercased; `bin` when there is none.
pub(crate) fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

pub(crate) fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Unit 1.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "bin");
        assert_eq!(file_extension("weird.p/df"), "bin");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("xyz"), "application/octet-stream");
    }
}

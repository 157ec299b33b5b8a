//! Data behind the home feed and the user dashboard.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::{Backend, Session};
use crate::config::{AuthConfig, FeedConfig};
use crate::entities::{Announcement, Course, Note, Profile, Reminder};
use crate::error::ValidationError;
use crate::filters;
use crate::repositories::{
    AnnouncementRepository, BookmarkRepository, CourseRepository, NoteHistoryRepository, NoteRepository,
    ProfileRepository, ReminderRepository,
};
use crate::routing::Viewer;

/// Side panel of the feed: admins see announcements, students their reminders.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedPanel {
    Announcements(Vec<Announcement>),
    Upcoming(Vec<Reminder>),
}

#[derive(Clone, Debug)]
pub struct Feed {
    pub profile: Option<Profile>,
    pub is_admin: bool,
    pub recent_notes: Vec<Note>,
    pub recent_courses: Vec<Course>,
    pub panel: FeedPanel,
    /// Downloads recorded in the user's history.
    pub downloads: u64,
}

#[derive(Clone, Debug)]
pub struct UserDashboard {
    pub profile: Option<Profile>,
    pub notes: Vec<Note>,
    pub bookmarks: HashSet<String>,
    pub saved: Vec<Note>,
    pub announcements: Vec<Announcement>,
    pub recommended: Vec<Note>,
    pub recently_viewed: Vec<Note>,
}

pub struct DashboardService {
    backend: Arc<dyn Backend>,
    auth: AuthConfig,
    limits: FeedConfig,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn Backend>, auth: AuthConfig, limits: FeedConfig) -> Self {
        Self { backend, auth, limits }
    }

    fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    async fn session(&self) -> Result<Session> {
        Ok(self.backend.session().await.ok_or(ValidationError::NotSignedIn)?)
    }

    /// The home feed for the signed-in user as of `now`.
    pub async fn feed(&self, now: DateTime<Utc>) -> Result<Feed> {
        let session = self.session().await?;
        let user_id = session.user_id();

        let profile = ProfileRepository::get_by_id(self.backend(), user_id)
            .await
            .context("Failed to load profile")?;
        let is_admin = Viewer::from_session(&session, profile.clone()).is_admin(&self.auth);

        let recent_notes = NoteRepository::get_recent(self.backend(), self.limits.recent_notes)
            .await
            .context("Failed to load notes")?;
        let recent_courses = CourseRepository::get_published(self.backend(), Some(self.limits.recent_courses))
            .await
            .context("Failed to load courses")?;

        let panel = if is_admin {
            FeedPanel::Announcements(
                AnnouncementRepository::get_recent(self.backend(), Some(self.limits.admin_announcements))
                    .await
                    .context("Failed to load announcements")?,
            )
        } else {
            FeedPanel::Upcoming(
                ReminderRepository::get_upcoming(self.backend(), user_id, now, self.limits.upcoming_reminders)
                    .await
                    .context("Failed to load reminders")?,
            )
        };

        let downloads = match NoteHistoryRepository::count_downloads(self.backend(), user_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Counting downloads failed: {:#}", e);
                0
            }
        };

        debug!(
            "Feed for {}: {} notes, {} courses, admin={}",
            user_id,
            recent_notes.len(),
            recent_courses.len(),
            is_admin
        );

        Ok(Feed {
            profile,
            is_admin,
            recent_notes,
            recent_courses,
            panel,
            downloads,
        })
    }

    /// Everything the user dashboard shows. A profile missing its email gets
    /// the session's email first.
    pub async fn user_dashboard(&self) -> Result<UserDashboard> {
        let session = self.session().await?;
        let user_id = session.user_id();

        let mut profile = ProfileRepository::get_by_id(self.backend(), user_id)
            .await
            .context("Failed to load profile")?;
        if let (Some(current), Some(email)) = (profile.as_mut(), session.email()) {
            if current.email.as_deref().map_or(true, str::is_empty) {
                match ProfileRepository::update(self.backend(), user_id, json!({ "email": email })).await {
                    Ok(Some(updated)) => *current = updated,
                    Ok(None) => {}
                    Err(e) => warn!("Could not sync email for {}: {:#}", user_id, e),
                }
            }
        }

        let bookmarks: HashSet<String> = BookmarkRepository::get_for_user(self.backend(), user_id)
            .await
            .context("Failed to load bookmarks")?
            .into_iter()
            .map(|b| b.note_id)
            .collect();
        let notes = NoteRepository::get_all(self.backend())
            .await
            .context("Failed to load notes")?;
        let announcement_limit = Some(self.limits.dashboard_announcements);
        let announcements = AnnouncementRepository::get_recent(self.backend(), announcement_limit)
            .await
            .context("Failed to load announcements")?;
        let history = NoteHistoryRepository::get_recent_for_user(self.backend(), user_id, self.limits.recently_viewed)
            .await
            .context("Failed to load history")?;

        Ok(UserDashboard {
            saved: filters::saved_notes(&notes, &bookmarks),
            recommended: filters::recommended_notes(&notes, profile.as_ref(), self.limits.recommendations),
            recently_viewed: filters::recently_viewed(&history, &notes, self.limits.recently_viewed),
            profile,
            notes,
            bookmarks,
            announcements,
        })
    }
}

//! Administrator operations.
//!
//! Every operation re-checks that the current session belongs to an admin
//! before touching the backend.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::{Backend, Session};
use crate::config::{AuthConfig, StorageConfig};
use crate::constants::{
    ERROR_ACCESS_DENIED, SUCCESS_ANNOUNCEMENT_DELETED, SUCCESS_ANNOUNCEMENT_POSTED, SUCCESS_NOTE_DELETED,
    SUCCESS_NOTE_UPLOADED, SUCCESS_USER_DELETED, SUCCESS_USER_UPDATED,
};
use crate::entities::{
    Announcement, AnnouncementType, Course, CourseUpdate, NewAnnouncement, NewCourse, NewNote, Note, NoteStatus,
    Profile, Role, Subject,
};
use crate::error::ValidationError;
use crate::filters::{self, Analytics, NoteFilter};
use crate::notifications::Notifier;
use crate::repositories::{
    AnnouncementRepository, CourseRepository, NoteRepository, ProfileRepository, SubjectRepository,
};
use crate::routing::Viewer;

use super::{content_type_for, file_extension};

/// A file to publish as a note.
#[derive(Clone, Debug)]
pub struct NoteUpload {
    pub title: String,
    pub subject: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fields an admin may change on another user's profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserEdit {
    pub full_name: Option<String>,
    pub is_admin: Option<bool>,
    pub blocked: Option<bool>,
}

pub struct AdminService {
    backend: Arc<dyn Backend>,
    auth: AuthConfig,
    storage: StorageConfig,
    notifier: Notifier,
}

impl AdminService {
    pub fn new(backend: Arc<dyn Backend>, auth: AuthConfig, storage: StorageConfig, notifier: Notifier) -> Self {
        Self {
            backend,
            auth,
            storage,
            notifier,
        }
    }

    fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The admin's session, or `AccessDenied` / `NotSignedIn`.
    ///
    /// Also copies a missing email onto the admin's profile.
    pub async fn require_admin(&self) -> Result<Session> {
        let session = self.backend.session().await.ok_or(ValidationError::NotSignedIn)?;
        let profile = ProfileRepository::get_by_id(self.backend(), session.user_id()).await?;

        let viewer = Viewer::from_session(&session, profile.clone());
        if !viewer.is_admin(&self.auth) {
            self.notifier.error(ERROR_ACCESS_DENIED);
            return Err(ValidationError::AccessDenied.into());
        }

        if let (Some(profile), Some(email)) = (profile, session.email()) {
            if profile.email.as_deref().map_or(true, str::is_empty) {
                let patch = serde_json::json!({ "email": email });
                if let Err(e) = ProfileRepository::update(self.backend(), &profile.id, patch).await {
                    warn!("Could not sync admin email: {:#}", e);
                }
            }
        }
        Ok(session)
    }

    // Notes

    pub async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        self.require_admin().await?;
        let notes = NoteRepository::get_all(self.backend()).await.context("Failed to load notes")?;
        Ok(filter.apply(&notes))
    }

    /// Upload a file to the notes bucket and publish it, already approved.
    pub async fn upload_note(&self, upload: NoteUpload) -> Result<Note> {
        let session = self.require_admin().await?;
        let title = upload.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyField { field: "Title" }.into());
        }
        if upload.bytes.is_empty() {
            return Err(ValidationError::MissingFile.into());
        }

        let extension = file_extension(&upload.file_name);
        let storage_path = format!("{}_{}.{}", Utc::now().timestamp_millis(), Uuid::new_v4(), extension);
        self.backend
            .upload(
                &self.storage.notes_bucket,
                &storage_path,
                upload.bytes,
                content_type_for(&extension),
                true,
            )
            .await
            .context("Upload failed")?;

        let note = NewNote {
            title: title.to_string(),
            subject: upload.subject.trim().to_string(),
            file_url: self.backend.public_url(&self.storage.notes_bucket, &storage_path),
            storage_path,
            status: NoteStatus::Approved,
            version: 1,
            user_id: session.user_id().to_string(),
        };
        let note = NoteRepository::insert(self.backend(), &note)
            .await
            .context("Failed to save note")?;
        info!("Uploaded note {} ({})", note.id, note.title);
        self.notifier.success(SUCCESS_NOTE_UPLOADED);
        Ok(note)
    }

    pub async fn set_note_status(&self, note_id: &str, status: NoteStatus) -> Result<Option<Note>> {
        self.require_admin().await?;
        let note = NoteRepository::set_status(self.backend(), note_id, &status)
            .await
            .context("Status update failed")?;
        self.notifier.success(format!("Note {} successfully", status));
        Ok(note)
    }

    /// Remove the stored file, then the row. A failed file removal is only logged.
    pub async fn delete_note(&self, note: &Note) -> Result<()> {
        self.require_admin().await?;
        if let Some(path) = note.storage_path.as_deref().filter(|p| !p.is_empty()) {
            if let Err(e) = self
                .backend
                .remove(&self.storage.notes_bucket, &[path.to_string()])
                .await
            {
                warn!("Removing file {} for note {} failed: {}", path, note.id, e);
            }
        }
        NoteRepository::delete(self.backend(), &note.id)
            .await
            .context("Delete failed")?;
        self.notifier.success(SUCCESS_NOTE_DELETED);
        Ok(())
    }

    // Users

    pub async fn list_users(&self, search: &str) -> Result<Vec<Profile>> {
        self.require_admin().await?;
        let users = ProfileRepository::get_all(self.backend())
            .await
            .context("Failed to load users")?;
        Ok(filters::filter_users(&users, search))
    }

    pub async fn update_user(&self, user_id: &str, edit: UserEdit) -> Result<Option<Profile>> {
        self.require_admin().await?;
        let mut patch = Map::new();
        if let Some(full_name) = edit.full_name {
            patch.insert("full_name".to_string(), Value::from(full_name));
        }
        if let Some(is_admin) = edit.is_admin {
            let role = if is_admin { Role::Admin } else { Role::Student };
            patch.insert("is_admin".to_string(), Value::from(is_admin));
            patch.insert("role".to_string(), Value::from(role.as_str()));
        }
        if let Some(blocked) = edit.blocked {
            patch.insert("blocked".to_string(), Value::from(blocked));
        }
        if patch.is_empty() {
            return ProfileRepository::get_by_id(self.backend(), user_id).await;
        }

        let profile = ProfileRepository::update(self.backend(), user_id, Value::Object(patch))
            .await
            .context("Update failed")?;
        self.notifier.success(SUCCESS_USER_UPDATED);
        Ok(profile)
    }

    /// Change a user's role; `role` and `is_admin` are written together.
    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<Option<Profile>> {
        self.require_admin().await?;
        let profile = ProfileRepository::set_role(self.backend(), user_id, role.clone())
            .await
            .context("Role update failed")?;
        self.notifier.success(format!("Role updated to {}", role.as_str()));
        Ok(profile)
    }

    pub async fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<Option<Profile>> {
        self.require_admin().await?;
        let profile = ProfileRepository::set_blocked(self.backend(), user_id, blocked)
            .await
            .context("Update failed")?;
        self.notifier.success(SUCCESS_USER_UPDATED);
        Ok(profile)
    }

    /// Delete a user's profile data.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.require_admin().await?;
        ProfileRepository::delete(self.backend(), user_id)
            .await
            .context("Delete failed")?;
        self.notifier.success(SUCCESS_USER_DELETED);
        Ok(())
    }

    // Announcements

    pub async fn list_announcements(&self) -> Result<Vec<Announcement>> {
        self.require_admin().await?;
        AnnouncementRepository::get_recent(self.backend(), None)
            .await
            .context("Failed to load announcements")
    }

    pub async fn post_announcement(
        &self,
        title: &str,
        content: &str,
        announcement_type: AnnouncementType,
    ) -> Result<Announcement> {
        let session = self.require_admin().await?;
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Title" }.into());
        }
        let announcement = NewAnnouncement {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            announcement_type,
            created_by: session.user_id().to_string(),
        };
        let announcement = AnnouncementRepository::insert(self.backend(), &announcement)
            .await
            .context("Failed to post announcement")?;
        self.notifier.success(SUCCESS_ANNOUNCEMENT_POSTED);
        Ok(announcement)
    }

    pub async fn delete_announcement(&self, announcement_id: &str) -> Result<()> {
        self.require_admin().await?;
        AnnouncementRepository::delete(self.backend(), announcement_id)
            .await
            .context("Delete failed")?;
        self.notifier.success(SUCCESS_ANNOUNCEMENT_DELETED);
        Ok(())
    }

    // Subjects

    pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.require_admin().await?;
        SubjectRepository::get_all(self.backend()).await
    }

    pub async fn add_subject(&self, name: &str) -> Result<Subject> {
        self.require_admin().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "Subject name" }.into());
        }
        SubjectRepository::insert(self.backend(), name)
            .await
            .context("Failed to add subject")
    }

    pub async fn rename_subject(&self, subject_id: &str, name: &str) -> Result<Option<Subject>> {
        self.require_admin().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "Subject name" }.into());
        }
        SubjectRepository::rename(self.backend(), subject_id, name)
            .await
            .context("Failed to rename subject")
    }

    pub async fn delete_subject(&self, subject_id: &str) -> Result<()> {
        self.require_admin().await?;
        SubjectRepository::delete(self.backend(), subject_id)
            .await
            .context("Failed to delete subject")
    }

    // Courses

    /// Every course, published or not.
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        self.require_admin().await?;
        CourseRepository::get_all(self.backend()).await
    }

    pub async fn create_course(&self, course: NewCourse) -> Result<Course> {
        self.require_admin().await?;
        if course.title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Title" }.into());
        }
        CourseRepository::insert(self.backend(), &course)
            .await
            .context("Failed to create course")
    }

    pub async fn update_course(&self, course_id: &str, update: CourseUpdate) -> Result<Option<Course>> {
        self.require_admin().await?;
        CourseRepository::update(self.backend(), course_id, &update)
            .await
            .context("Failed to update course")
    }

    pub async fn set_course_published(&self, course_id: &str, is_published: bool) -> Result<Option<Course>> {
        self.require_admin().await?;
        CourseRepository::set_published(self.backend(), course_id, is_published)
            .await
            .context("Failed to update course")
    }

    pub async fn delete_course(&self, course_id: &str) -> Result<()> {
        self.require_admin().await?;
        CourseRepository::delete(self.backend(), course_id)
            .await
            .context("Failed to delete course")
    }

    // Analytics

    pub async fn analytics(&self) -> Result<Analytics> {
        self.require_admin().await?;
        let notes = NoteRepository::get_all(self.backend()).await?;
        let users = ProfileRepository::get_all(self.backend()).await?;
        Ok(filters::analytics(&notes, &users))
    }
}

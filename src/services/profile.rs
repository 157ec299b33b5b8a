//! The signed-in user's own profile.

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::StorageConfig;
use crate::constants::{SUCCESS_AVATAR_UPLOADED, SUCCESS_PROFILE_UPDATED};
use crate::entities::{Profile, ProfileUpdate};
use crate::error::ValidationError;
use crate::notifications::Notifier;
use crate::repositories::ProfileRepository;
use crate::utils::datetime;

use super::{content_type_for, file_extension};

/// Editable profile fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileEdit {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub enrollment_no: Option<String>,
}

pub struct ProfileService {
    backend: Arc<dyn Backend>,
    storage: StorageConfig,
    notifier: Notifier,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn Backend>, storage: StorageConfig, notifier: Notifier) -> Self {
        Self {
            backend,
            storage,
            notifier,
        }
    }

    pub async fn load(&self, user_id: &str) -> Result<Option<Profile>> {
        ProfileRepository::get_by_id(self.backend.as_ref(), user_id)
            .await
            .context("Failed to load profile")
    }

    pub async fn update(&self, user_id: &str, edit: ProfileEdit) -> Result<Profile> {
        let update = ProfileUpdate {
            full_name: edit.full_name,
            phone: edit.phone,
            course: edit.course,
            year: edit.year,
            enrollment_no: edit.enrollment_no,
            updated_at: Some(datetime::now_rfc3339()),
            ..ProfileUpdate::new(user_id)
        };
        let profile = ProfileRepository::upsert(self.backend.as_ref(), &update)
            .await
            .context("Failed to update profile")?;
        self.notifier.success(SUCCESS_PROFILE_UPDATED);
        Ok(profile)
    }

    /// Store a new avatar at `<user_id>/<millis>.<ext>` and point the profile at it.
    pub async fn upload_avatar(&self, user_id: &str, file_name: &str, bytes: Vec<u8>) -> Result<Profile> {
        if bytes.is_empty() {
            return Err(ValidationError::MissingFile.into());
        }
        let extension = file_extension(file_name);
        let path = format!("{}/{}.{}", user_id, Utc::now().timestamp_millis(), extension);

        self.backend
            .upload(&self.storage.avatars_bucket, &path, bytes, content_type_for(&extension), true)
            .await
            .context("Failed to upload avatar")?;
        let avatar_url = self.backend.public_url(&self.storage.avatars_bucket, &path);

        let update = ProfileUpdate {
            avatar_url: Some(avatar_url),
            updated_at: Some(datetime::now_rfc3339()),
            ..ProfileUpdate::new(user_id)
        };
        let profile = ProfileRepository::upsert(self.backend.as_ref(), &update)
            .await
            .context("Failed to save avatar")?;
        info!("Avatar for {} stored at {}", user_id, path);
        self.notifier.success(SUCCESS_AVATAR_UPLOADED);
        Ok(profile)
    }
}

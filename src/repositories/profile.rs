//! Profile repository.

use anyhow::{bail, Result};
use serde_json::{json, Value};

use super::{decode_rows, encode, first_row};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_PROFILES;
use crate::entities::{Profile, ProfileUpdate, Role};

/// Repository for profile-related operations.
pub struct ProfileRepository;

impl ProfileRepository {
    /// Get a single profile by user id.
    pub async fn get_by_id(backend: &dyn Backend, user_id: &str) -> Result<Option<Profile>> {
        let rows = backend
            .select(TABLE_PROFILES, &Query::new().eq("id", user_id).limit(1))
            .await?;
        first_row(TABLE_PROFILES, rows)
    }

    /// Get all profiles, newest first.
    pub async fn get_all(backend: &dyn Backend) -> Result<Vec<Profile>> {
        let rows = backend
            .select(TABLE_PROFILES, &Query::new().order_desc("created_at"))
            .await?;
        decode_rows(TABLE_PROFILES, rows)
    }

    /// Insert or merge profile fields.
    pub async fn upsert(backend: &dyn Backend, update: &ProfileUpdate) -> Result<Profile> {
        let row = backend.upsert(TABLE_PROFILES, encode(TABLE_PROFILES, update)?).await?;
        super::decode_row(TABLE_PROFILES, row)
    }

    /// Apply a patch to one profile. Returns the updated row, if it exists.
    pub async fn update(backend: &dyn Backend, user_id: &str, patch: Value) -> Result<Option<Profile>> {
        let rows = backend
            .update(TABLE_PROFILES, &[Filter::eq("id", user_id)], patch)
            .await?;
        first_row(TABLE_PROFILES, rows)
    }

    /// Set `role` and `is_admin` together so they never disagree.
    pub async fn set_role(backend: &dyn Backend, user_id: &str, role: Role) -> Result<Option<Profile>> {
        let is_admin = role == Role::Admin;
        Self::update(backend, user_id, json!({ "role": role.as_str(), "is_admin": is_admin })).await
    }

    pub async fn set_blocked(backend: &dyn Backend, user_id: &str, blocked: bool) -> Result<Option<Profile>> {
        Self::update(backend, user_id, json!({ "blocked": blocked })).await
    }

    /// Delete a profile row. The auth account itself is managed by the backend.
    pub async fn delete(backend: &dyn Backend, user_id: &str) -> Result<()> {
        backend.delete(TABLE_PROFILES, &[Filter::eq("id", user_id)]).await?;
        Ok(())
    }

    /// Read an integer counter column. A null column reads as zero; a missing
    /// profile row is an error.
    pub async fn get_counter(backend: &dyn Backend, user_id: &str, column: &str) -> Result<i64> {
        let rows = backend
            .select(TABLE_PROFILES, &Query::new().select(column).eq("id", user_id).limit(1))
            .await?;
        let Some(row) = rows.first() else {
            bail!("No profile for {}", user_id);
        };
        Ok(row.get(column).and_then(Value::as_i64).unwrap_or(0))
    }

    /// Write a counter column. Fails when no profile row was updated.
    pub async fn set_counter(backend: &dyn Backend, user_id: &str, column: &str, value: i64) -> Result<()> {
        let mut patch = serde_json::Map::new();
        patch.insert(column.to_string(), json!(value));
        let rows = backend
            .update(TABLE_PROFILES, &[Filter::eq("id", user_id)], Value::Object(patch))
            .await?;
        if rows.is_empty() {
            bail!("No profile for {}", user_id);
        }
        Ok(())
    }
}

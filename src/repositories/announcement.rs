//! Announcement repository.

use anyhow::Result;

use super::{decode_row, decode_rows, encode};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_ANNOUNCEMENTS;
use crate::entities::{Announcement, NewAnnouncement};

/// Repository for announcement-related operations.
pub struct AnnouncementRepository;

impl AnnouncementRepository {
    /// Get announcements, newest first, optionally capped at `limit`.
    pub async fn get_recent(backend: &dyn Backend, limit: Option<usize>) -> Result<Vec<Announcement>> {
        let mut query = Query::new().order_desc("created_at");
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = backend.select(TABLE_ANNOUNCEMENTS, &query).await?;
        decode_rows(TABLE_ANNOUNCEMENTS, rows)
    }

    pub async fn insert(backend: &dyn Backend, announcement: &NewAnnouncement) -> Result<Announcement> {
        let row = backend
            .insert(TABLE_ANNOUNCEMENTS, encode(TABLE_ANNOUNCEMENTS, announcement)?)
            .await?;
        decode_row(TABLE_ANNOUNCEMENTS, row)
    }

    pub async fn delete(backend: &dyn Backend, announcement_id: &str) -> Result<()> {
        backend
            .delete(TABLE_ANNOUNCEMENTS, &[Filter::eq("id", announcement_id)])
            .await?;
        Ok(())
    }
}

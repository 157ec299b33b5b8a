//! Bookmark repository.

use anyhow::Result;

use super::{decode_rows, encode};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_BOOKMARKS;
use crate::entities::{Bookmark, NewBookmark};

/// Repository for bookmark-related operations.
pub struct BookmarkRepository;

impl BookmarkRepository {
    /// Get all bookmarks belonging to a user.
    pub async fn get_for_user(backend: &dyn Backend, user_id: &str) -> Result<Vec<Bookmark>> {
        let rows = backend
            .select(TABLE_BOOKMARKS, &Query::new().eq("user_id", user_id))
            .await?;
        decode_rows(TABLE_BOOKMARKS, rows)
    }

    pub async fn add(backend: &dyn Backend, user_id: &str, note_id: &str) -> Result<()> {
        let body = NewBookmark {
            user_id: user_id.to_string(),
            note_id: note_id.to_string(),
        };
        backend.insert(TABLE_BOOKMARKS, encode(TABLE_BOOKMARKS, &body)?).await?;
        Ok(())
    }

    pub async fn remove(backend: &dyn Backend, user_id: &str, note_id: &str) -> Result<()> {
        backend
            .delete(
                TABLE_BOOKMARKS,
                &[Filter::eq("user_id", user_id), Filter::eq("note_id", note_id)],
            )
            .await?;
        Ok(())
    }
}

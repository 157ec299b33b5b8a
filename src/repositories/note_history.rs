//! Note history repository.

use anyhow::Result;

use super::{decode_rows, encode};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_NOTE_HISTORY;
use crate::entities::{HistoryAction, NewHistoryEntry, NoteHistory};

/// Repository for the per-user note activity log.
pub struct NoteHistoryRepository;

impl NoteHistoryRepository {
    pub async fn record(backend: &dyn Backend, user_id: &str, note_id: &str, action: HistoryAction) -> Result<()> {
        let entry = NewHistoryEntry {
            user_id: user_id.to_string(),
            note_id: note_id.to_string(),
            action_type: action,
        };
        backend
            .insert(TABLE_NOTE_HISTORY, encode(TABLE_NOTE_HISTORY, &entry)?)
            .await?;
        Ok(())
    }

    /// A user's most recent history rows, newest first.
    pub async fn get_recent_for_user(backend: &dyn Backend, user_id: &str, limit: usize) -> Result<Vec<NoteHistory>> {
        let rows = backend
            .select(
                TABLE_NOTE_HISTORY,
                &Query::new().eq("user_id", user_id).order_desc("created_at").limit(limit),
            )
            .await?;
        decode_rows(TABLE_NOTE_HISTORY, rows)
    }

    /// Number of downloads a user has made.
    pub async fn count_downloads(backend: &dyn Backend, user_id: &str) -> Result<u64> {
        Ok(backend
            .count(
                TABLE_NOTE_HISTORY,
                &[
                    Filter::eq("user_id", user_id),
                    Filter::eq("action_type", HistoryAction::Download.as_str()),
                ],
            )
            .await?)
    }
}

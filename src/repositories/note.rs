//! Note repository.

use anyhow::Result;
use serde_json::json;

use super::{decode_row, decode_rows, encode, first_row};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_NOTES;
use crate::entities::{NewNote, Note, NoteStatus};

/// Repository for note-related operations.
pub struct NoteRepository;

impl NoteRepository {
    /// Get all notes, newest first.
    pub async fn get_all(backend: &dyn Backend) -> Result<Vec<Note>> {
        let rows = backend.select(TABLE_NOTES, &Query::new().order_desc("created_at")).await?;
        decode_rows(TABLE_NOTES, rows)
    }

    /// Get the `limit` newest notes.
    pub async fn get_recent(backend: &dyn Backend, limit: usize) -> Result<Vec<Note>> {
        let rows = backend
            .select(TABLE_NOTES, &Query::new().order_desc("created_at").limit(limit))
            .await?;
        decode_rows(TABLE_NOTES, rows)
    }

    pub async fn get_by_id(backend: &dyn Backend, note_id: &str) -> Result<Option<Note>> {
        let rows = backend
            .select(TABLE_NOTES, &Query::new().eq("id", note_id).limit(1))
            .await?;
        first_row(TABLE_NOTES, rows)
    }

    pub async fn insert(backend: &dyn Backend, note: &NewNote) -> Result<Note> {
        let row = backend.insert(TABLE_NOTES, encode(TABLE_NOTES, note)?).await?;
        decode_row(TABLE_NOTES, row)
    }

    pub async fn set_status(backend: &dyn Backend, note_id: &str, status: &NoteStatus) -> Result<Option<Note>> {
        let rows = backend
            .update(TABLE_NOTES, &[Filter::eq("id", note_id)], json!({ "status": status }))
            .await?;
        first_row(TABLE_NOTES, rows)
    }

    pub async fn delete(backend: &dyn Backend, note_id: &str) -> Result<()> {
        backend.delete(TABLE_NOTES, &[Filter::eq("id", note_id)]).await?;
        Ok(())
    }
}

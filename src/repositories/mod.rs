//! Repository layer for table access.
//!
//! This module provides repository structs that encapsulate the queries the
//! portal issues against each backend table. Repositories keep entities as pure
//! data models while providing reusable access methods over `&dyn Backend`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub mod announcement;
pub mod bookmark;
pub mod course;
pub mod note;
pub mod note_history;
pub mod profile;
pub mod reminder;
pub mod subject;
pub mod todo;

pub use announcement::AnnouncementRepository;
pub use bookmark::BookmarkRepository;
pub use course::CourseRepository;
pub use note::NoteRepository;
pub use note_history::NoteHistoryRepository;
pub use profile::ProfileRepository;
pub use reminder::ReminderRepository;
pub use subject::SubjectRepository;
pub use todo::TodoRepository;

/// Decode raw rows from `table` into entities.
pub(crate) fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

pub(crate) fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T> {
    serde_json::from_value(row).with_context(|| format!("Malformed row in '{}'", table))
}

/// First row of a write's returned representation.
pub(crate) fn first_row<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Option<T>> {
    rows.into_iter().next().map(|row| decode_row(table, row)).transpose()
}

pub(crate) fn encode<T: Serialize>(table: &str, body: &T) -> Result<Value> {
    serde_json::to_value(body).with_context(|| format!("Failed to encode row for '{}'", table))
}

//! Subject repository.

use anyhow::Result;
use serde_json::json;

use super::{decode_row, decode_rows, encode, first_row};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_SUBJECTS;
use crate::entities::{NewSubject, Subject};

/// Repository for subject-related operations.
pub struct SubjectRepository;

impl SubjectRepository {
    /// Get all subjects ordered by name.
    pub async fn get_all(backend: &dyn Backend) -> Result<Vec<Subject>> {
        let rows = backend.select(TABLE_SUBJECTS, &Query::new().order_asc("name")).await?;
        decode_rows(TABLE_SUBJECTS, rows)
    }

    pub async fn insert(backend: &dyn Backend, name: &str) -> Result<Subject> {
        let body = NewSubject { name: name.to_string() };
        let row = backend.insert(TABLE_SUBJECTS, encode(TABLE_SUBJECTS, &body)?).await?;
        decode_row(TABLE_SUBJECTS, row)
    }

    pub async fn rename(backend: &dyn Backend, subject_id: &str, name: &str) -> Result<Option<Subject>> {
        let rows = backend
            .update(TABLE_SUBJECTS, &[Filter::eq("id", subject_id)], json!({ "name": name }))
            .await?;
        first_row(TABLE_SUBJECTS, rows)
    }

    pub async fn delete(backend: &dyn Backend, subject_id: &str) -> Result<()> {
        backend.delete(TABLE_SUBJECTS, &[Filter::eq("id", subject_id)]).await?;
        Ok(())
    }
}

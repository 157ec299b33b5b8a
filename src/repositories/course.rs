//! Course repository.

use anyhow::Result;
use serde_json::json;

use super::{decode_row, decode_rows, encode, first_row};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_COURSES;
use crate::entities::{Course, CourseUpdate, NewCourse};

/// Course columns plus the embedded subject name.
const COURSE_COLUMNS: &str = "*, subjects(name)";

/// Repository for course-related operations.
pub struct CourseRepository;

impl CourseRepository {
    /// Get published courses, newest first, optionally capped at `limit`.
    pub async fn get_published(backend: &dyn Backend, limit: Option<usize>) -> Result<Vec<Course>> {
        let mut query = Query::new()
            .select(COURSE_COLUMNS)
            .eq("is_published", true)
            .order_desc("created_at");
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = backend.select(TABLE_COURSES, &query).await?;
        decode_rows(TABLE_COURSES, rows)
    }

    /// Get every course, published or not, newest first.
    pub async fn get_all(backend: &dyn Backend) -> Result<Vec<Course>> {
        let rows = backend
            .select(TABLE_COURSES, &Query::new().select(COURSE_COLUMNS).order_desc("created_at"))
            .await?;
        decode_rows(TABLE_COURSES, rows)
    }

    pub async fn insert(backend: &dyn Backend, course: &NewCourse) -> Result<Course> {
        let row = backend.insert(TABLE_COURSES, encode(TABLE_COURSES, course)?).await?;
        decode_row(TABLE_COURSES, row)
    }

    pub async fn update(backend: &dyn Backend, course_id: &str, update: &CourseUpdate) -> Result<Option<Course>> {
        let rows = backend
            .update(
                TABLE_COURSES,
                &[Filter::eq("id", course_id)],
                encode(TABLE_COURSES, update)?,
            )
            .await?;
        first_row(TABLE_COURSES, rows)
    }

    pub async fn set_published(backend: &dyn Backend, course_id: &str, is_published: bool) -> Result<Option<Course>> {
        let rows = backend
            .update(
                TABLE_COURSES,
                &[Filter::eq("id", course_id)],
                json!({ "is_published": is_published }),
            )
            .await?;
        first_row(TABLE_COURSES, rows)
    }

    pub async fn delete(backend: &dyn Backend, course_id: &str) -> Result<()> {
        backend.delete(TABLE_COURSES, &[Filter::eq("id", course_id)]).await?;
        Ok(())
    }
}

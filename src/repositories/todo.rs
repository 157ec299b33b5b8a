//! Todo repository.

use anyhow::Result;
use serde_json::json;

use super::{decode_row, decode_rows, encode};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_TODOS;
use crate::entities::{NewTodo, Todo};

/// Repository for todo-related operations.
pub struct TodoRepository;

impl TodoRepository {
    /// Get a user's todos, newest first.
    pub async fn get_for_user(backend: &dyn Backend, user_id: &str) -> Result<Vec<Todo>> {
        let rows = backend
            .select(TABLE_TODOS, &Query::new().eq("user_id", user_id).order_desc("created_at"))
            .await?;
        decode_rows(TABLE_TODOS, rows)
    }

    pub async fn insert(backend: &dyn Backend, todo: &NewTodo) -> Result<Todo> {
        let row = backend.insert(TABLE_TODOS, encode(TABLE_TODOS, todo)?).await?;
        decode_row(TABLE_TODOS, row)
    }

    pub async fn set_completed(backend: &dyn Backend, todo_id: &str, is_completed: bool) -> Result<()> {
        backend
            .update(TABLE_TODOS, &[Filter::eq("id", todo_id)], json!({ "is_completed": is_completed }))
            .await?;
        Ok(())
    }

    pub async fn delete(backend: &dyn Backend, todo_id: &str) -> Result<()> {
        backend.delete(TABLE_TODOS, &[Filter::eq("id", todo_id)]).await?;
        Ok(())
    }
}

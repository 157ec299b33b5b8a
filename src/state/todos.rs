use log::warn;
use std::sync::Arc;

use super::Outcome;
use crate::backend::Backend;
use crate::constants::{ERROR_LOAD_FAILED, ERROR_TODO_ADD_FAILED, ERROR_TODO_DELETE_FAILED, ERROR_TODO_UPDATE_FAILED};
use crate::entities::{NewTodo, Todo};
use crate::notifications::Notifier;
use crate::repositories::TodoRepository;

/// A user's to-do list, newest first.
pub struct TodoList {
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    user_id: String,
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(backend: Arc<dyn Backend>, notifier: Notifier, user_id: &str) -> Self {
        Self {
            backend,
            notifier,
            user_id: user_id.to_string(),
            todos: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, todo_id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == todo_id)
    }

    pub async fn load(&mut self) -> Outcome {
        match TodoRepository::get_for_user(self.backend.as_ref(), &self.user_id).await {
            Ok(todos) => {
                self.todos = todos;
                Outcome::Applied
            }
            Err(e) => {
                warn!("Loading todos failed: {:#}", e);
                self.notifier.error(ERROR_LOAD_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Add a task. Blank input is ignored; the stored row goes to the top.
    pub async fn add(&mut self, task: &str) -> Outcome {
        let task = task.trim();
        if task.is_empty() {
            return Outcome::Ignored;
        }
        match TodoRepository::insert(self.backend.as_ref(), &NewTodo::new(&self.user_id, task)).await {
            Ok(todo) => {
                self.todos.insert(0, todo);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Adding todo failed: {:#}", e);
                self.notifier.error(ERROR_TODO_ADD_FAILED);
                Outcome::Failed
            }
        }
    }

    pub async fn toggle(&mut self, todo_id: &str) -> Outcome {
        let Some(index) = self.todos.iter().position(|t| t.id == todo_id) else {
            return Outcome::Ignored;
        };
        let snapshot = self.todos.clone();
        let completed = !self.todos[index].is_completed;
        self.todos[index].is_completed = completed;

        match TodoRepository::set_completed(self.backend.as_ref(), todo_id, completed).await {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("Updating todo {} failed: {:#}", todo_id, e);
                self.notifier.error(ERROR_TODO_UPDATE_FAILED);
                self.resync(snapshot).await;
                Outcome::Reverted
            }
        }
    }

    pub async fn delete(&mut self, todo_id: &str) -> Outcome {
        if self.get(todo_id).is_none() {
            return Outcome::Ignored;
        }
        let snapshot = self.todos.clone();
        self.todos.retain(|t| t.id != todo_id);

        match TodoRepository::delete(self.backend.as_ref(), todo_id).await {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("Deleting todo {} failed: {:#}", todo_id, e);
                self.notifier.error(ERROR_TODO_DELETE_FAILED);
                self.resync(snapshot).await;
                Outcome::Reverted
            }
        }
    }

    /// Reload from the backend, or fall back to `snapshot` when that fails too.
    async fn resync(&mut self, snapshot: Vec<Todo>) {
        match TodoRepository::get_for_user(self.backend.as_ref(), &self.user_id).await {
            Ok(todos) => self.todos = todos,
            Err(e) => {
                warn!("Reloading todos failed, restoring local copy: {:#}", e);
                self.todos = snapshot;
            }
        }
    }
}

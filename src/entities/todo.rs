use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub task: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTodo {
    pub user_id: String,
    pub task: String,
    pub is_completed: bool,
}

impl NewTodo {
    pub fn new(user_id: &str, task: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            task: task.to_string(),
            is_completed: false,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::id")]
    pub user_id: String,
    #[serde(deserialize_with = "wire::id")]
    pub note_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBookmark {
    pub user_id: String,
    pub note_id: String,
}

use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum HistoryAction {
    #[default]
    Download,
    View,
    Other(String),
}

impl HistoryAction {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryAction::Download => "download",
            HistoryAction::View => "view",
            HistoryAction::Other(value) => value,
        }
    }
}

impl From<Option<String>> for HistoryAction {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            None | Some("") | Some("download") => HistoryAction::Download,
            Some("view") => HistoryAction::View,
            Some(other) => HistoryAction::Other(other.to_string()),
        }
    }
}

impl From<HistoryAction> for String {
    fn from(action: HistoryAction) -> Self {
        action.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteHistory {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "wire::id")]
    pub note_id: String,
    #[serde(default)]
    pub action_type: HistoryAction,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewHistoryEntry {
    pub user_id: String,
    pub note_id: String,
    pub action_type: HistoryAction,
}

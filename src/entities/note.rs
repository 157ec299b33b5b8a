use serde::{Deserialize, Serialize};

use super::wire;

/// Moderation state of a note.
///
/// Rows written before moderation existed have no status. They read as
/// `Unset`, display as approved, but only match an "all statuses" filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum NoteStatus {
    #[default]
    Unset,
    Approved,
    Pending,
    Rejected,
    Other(String),
}

impl NoteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NoteStatus::Unset | NoteStatus::Approved => "approved",
            NoteStatus::Pending => "pending",
            NoteStatus::Rejected => "rejected",
            NoteStatus::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => NoteStatus::Unset,
            "approved" => NoteStatus::Approved,
            "pending" => NoteStatus::Pending,
            "rejected" => NoteStatus::Rejected,
            _ => NoteStatus::Other(value.trim().to_string()),
        }
    }
}

impl From<Option<String>> for NoteStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(NoteStatus::parse).unwrap_or_default()
    }
}

impl From<NoteStatus> for Option<String> {
    fn from(status: NoteStatus) -> Self {
        match status {
            NoteStatus::Unset => None,
            status => Some(status.as_str().to_string()),
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub subject: String,
    #[serde(rename = "fileUrl", default)]
    pub file_url: Option<String>,
    #[serde(rename = "storagePath", default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub subject: String,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "storagePath")]
    pub storage_path: String,
    pub status: NoteStatus,
    pub version: i64,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_or_missing_status_is_unset() {
        let note: Note = serde_json::from_str(r#"{"id": 1, "title": "DBMS", "status": null}"#).unwrap();
        assert_eq!(note.status, NoteStatus::Unset);
        let note: Note = serde_json::from_str(r#"{"id": 2, "title": "OS"}"#).unwrap();
        assert_eq!(note.status, NoteStatus::Unset);
        assert_eq!(note.subject, "");

        // Shown as approved, written back as null.
        assert_eq!(note.status.to_string(), "approved");
        assert_ne!(note.status, NoteStatus::Approved);
        assert!(serde_json::to_value(&note.status).unwrap().is_null());
    }

    #[test]
    fn test_wire_field_names() {
        let note: Note = serde_json::from_str(
            r#"{"id": "n1", "title": "CN", "subject": "Networks", "fileUrl": "https://x/a.pdf",
                "storagePath": "1_a.pdf", "status": "pending", "version": 1}"#,
        )
        .unwrap();
        assert_eq!(note.file_url.as_deref(), Some("https://x/a.pdf"));
        assert_eq!(note.storage_path.as_deref(), Some("1_a.pdf"));
        assert_eq!(note.status, NoteStatus::Pending);

        let body = serde_json::to_value(NewNote {
            title: "CN".to_string(),
            subject: "Networks".to_string(),
            file_url: "https://x/a.pdf".to_string(),
            storage_path: "1_a.pdf".to_string(),
            status: NoteStatus::Approved,
            version: 1,
            user_id: "u1".to_string(),
        })
        .unwrap();
        assert_eq!(body["fileUrl"], "https://x/a.pdf");
        assert_eq!(body["storagePath"], "1_a.pdf");
        assert_eq!(body["status"], "approved");
    }

    #[test]
    fn test_unknown_status_is_kept() {
        assert_eq!(NoteStatus::parse("archived"), NoteStatus::Other("archived".to_string()));
        assert_eq!(NoteStatus::parse("Rejected"), NoteStatus::Rejected);
    }
}

use serde::{Deserialize, Serialize};

use super::wire;

/// Visual category of an announcement. Unknown values read as `Info`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum AnnouncementType {
    #[default]
    Info,
    Warning,
    Success,
    Important,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::Info => "info",
            AnnouncementType::Warning => "warning",
            AnnouncementType::Success => "success",
            AnnouncementType::Important => "important",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warning" => AnnouncementType::Warning,
            "success" => AnnouncementType::Success,
            "important" => AnnouncementType::Important,
            _ => AnnouncementType::Info,
        }
    }
}

impl From<Option<String>> for AnnouncementType {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(AnnouncementType::parse).unwrap_or_default()
    }
}

impl From<AnnouncementType> for String {
    fn from(kind: AnnouncementType) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub content: String,
    #[serde(rename = "type", default)]
    pub announcement_type: AnnouncementType,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub announcement_type: AnnouncementType,
    pub created_by: String,
}

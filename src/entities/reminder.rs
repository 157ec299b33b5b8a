use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;
use crate::utils::datetime;

/// Kind of reminder. Free-form values are preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ReminderType {
    #[default]
    Assignment,
    Exam,
    Study,
    Other(String),
}

impl ReminderType {
    pub fn as_str(&self) -> &str {
        match self {
            ReminderType::Assignment => "assignment",
            ReminderType::Exam => "exam",
            ReminderType::Study => "study",
            ReminderType::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "assignment" => ReminderType::Assignment,
            "exam" => ReminderType::Exam,
            "study" => ReminderType::Study,
            _ => ReminderType::Other(value.trim().to_string()),
        }
    }
}

impl From<Option<String>> for ReminderType {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(ReminderType::parse).unwrap_or_default()
    }
}

impl From<ReminderType> for String {
    fn from(kind: ReminderType) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub reminder_date: String,
    #[serde(rename = "type", default)]
    pub reminder_type: ReminderType,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Reminder {
    /// When the reminder is due, if the stored date parses.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        datetime::parse_timestamp(&self.reminder_date)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewReminder {
    pub user_id: String,
    pub title: String,
    pub reminder_date: String,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
}

use serde::{Deserialize, Serialize};

use super::wire;

/// The `subjects(name)` embed on a course row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub subject_id: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_published: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub subjects: Option<SubjectRef>,
}

impl Course {
    /// Category shown for the course: the embedded subject name, if any.
    pub fn category(&self) -> Option<&str> {
        self.subjects
            .as_ref()
            .and_then(|subject| subject.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub subject_id: Option<String>,
    pub is_published: bool,
}

/// Partial course edit; unset fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_embedded_subject() {
        let course: Course = serde_json::from_str(
            r#"{"id": 1, "title": "Graphs", "subject_id": 7, "is_published": true, "subjects": {"name": "ADS"}}"#,
        )
        .unwrap();
        assert_eq!(course.category(), Some("ADS"));
        assert_eq!(course.subject_id.as_deref(), Some("7"));

        let loose: Course = serde_json::from_str(r#"{"id": 2, "title": "Loose", "subjects": null}"#).unwrap();
        assert_eq!(loose.category(), None);
        assert!(!loose.is_published);
    }
}

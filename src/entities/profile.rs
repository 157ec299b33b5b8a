use serde::{Deserialize, Serialize};

use super::wire;

/// Account role stored on the profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl From<String> for Role {
    /// Unrecognised roles get the least privileged one.
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Student
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub blocked: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_text")]
    pub year: Option<String>,
    #[serde(default)]
    pub enrollment_no: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub login_count: i64,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub download_count: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Whether the profile itself grants admin rights.
    pub fn has_admin_flag(&self) -> bool {
        self.is_admin || self.role == Role::Admin
    }

    /// Name to greet the user with: full name, else the email's local part.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Student".to_string())
    }
}

/// Partial profile write; unset fields are left untouched by the upsert.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ProfileUpdate {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_profile_row() {
        let profile: Profile = serde_json::from_str(
            r#"{"id": "u1", "role": null, "is_admin": null, "year": 2, "login_count": null}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Role::Student);
        assert!(!profile.is_admin);
        assert_eq!(profile.year.as_deref(), Some("2"));
        assert_eq!(profile.login_count, 0);
        assert!(!profile.has_admin_flag());
    }

    #[test]
    fn test_admin_flag_from_role() {
        let profile: Profile = serde_json::from_str(r#"{"id": "u1", "role": "ADMIN"}"#).unwrap();
        assert!(profile.has_admin_flag());
        assert_eq!(serde_json::to_value(&profile.role).unwrap(), "admin");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let profile: Profile =
            serde_json::from_str(r#"{"id": "u1", "full_name": "  ", "email": "riya.k@gmail.com"}"#).unwrap();
        assert_eq!(profile.display_name(), "riya.k");
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("98765".to_string()),
            ..ProfileUpdate::new("u1")
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"id": "u1", "phone": "98765"}));
    }
}

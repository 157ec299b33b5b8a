//! Client-side rejections raised before any backend call is made.

/// A request the client refuses to send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Only {domain} emails are allowed for students.")]
    SignupDomain { domain: String },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("{field} is required")]
    EmptyField { field: &'static str },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Please choose a file to upload")]
    MissingFile,

    #[error("You must be logged in")]
    NotSignedIn,

    #[error("Access Denied: Admins only.")]
    AccessDenied,

    #[error("Your account has been blocked. Please contact the administrator.")]
    Blocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::SignupDomain {
                domain: "@gmail.com".to_string()
            }
            .to_string(),
            "Only @gmail.com emails are allowed for students."
        );
        assert_eq!(
            ValidationError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(ValidationError::EmptyField { field: "Title" }.to_string(), "Title is required");
    }
}

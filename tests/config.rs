use backbenchers::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.backend.backend_type, "supabase");
    assert_eq!(config.backend.url_env, "SUPABASE_URL");
    assert_eq!(config.auth.admin_email, "schedule.manager4@gmail.com");
    assert_eq!(config.auth.student_email_domain, "@gmail.com");
    assert_eq!(config.auth.min_password_length, 6);
    assert_eq!(config.storage.notes_bucket, "notes");
    assert_eq!(config.storage.avatars_bucket, "avatars");
    assert_eq!(config.feed.recent_notes, 5);
    assert_eq!(config.feed.recent_courses, 4);
    assert_eq!(config.feed.admin_announcements, 2);
    assert_eq!(config.feed.upcoming_reminders, 3);
    assert!(!config.logging.enabled);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    config.backend.backend_type = "firebase".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.auth.student_email_domain = "gmail.com".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.auth.min_password_length = 3;
    assert!(config.validate().is_err());

    config = Config::default();
    config.feed.recent_notes = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_partial_config_deserialization() {
    let partial_toml = r#"
[backend]
backend_type = "memory"

[feed]
recent_notes = 8

[logging]
enabled = true
level = "debug"
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert_eq!(config.backend.backend_type, "memory");
    assert_eq!(config.feed.recent_notes, 8);
    assert!(config.logging.enabled);

    // Unspecified values keep their defaults
    assert_eq!(config.feed.recent_courses, 4);
    assert_eq!(config.backend.anon_key_env, "SUPABASE_ANON_KEY");
    assert_eq!(config.auth.reset_redirect_path, "/reset-password");
}

#[test]
fn test_load_from_file_validates() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[auth]\nmin_password_length = 2").unwrap();

    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("min_password_length"));
}

#[test]
fn test_load_from_file_reports_parse_errors() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[feed\nrecent_notes = ").unwrap();

    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_generate_default_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Backbenchers Configuration File"));

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.auth.admin_email, Config::default().auth.admin_email);
    assert_eq!(config.feed.recently_viewed, 5);
}

#[test]
fn test_resolve_credentials() {
    let mut config = Config::default();
    config.backend.url = Some("https://project.supabase.co".to_string());
    config.backend.anon_key = Some("anon".to_string());
    let credentials = config.backend.resolve_credentials().unwrap();
    assert_eq!(credentials.url, "https://project.supabase.co");
    assert_eq!(credentials.anon_key, "anon");

    config.backend.url = None;
    config.backend.url_env = "BACKBENCHERS_TEST_UNSET_URL_VARIABLE".to_string();
    assert!(config.backend.resolve_credentials().is_err());
}

#[test]
fn test_site_links() {
    let mut config = Config::default();
    config.auth.site_url = "https://backbenchers.example/".to_string();
    assert_eq!(
        config.auth.site_link("/reset-password"),
        "https://backbenchers.example/reset-password"
    );
    assert!(config.auth.is_admin_email("Schedule.Manager4@gmail.com"));
    assert!(!config.auth.is_admin_email("someone@gmail.com"));
}

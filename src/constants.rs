//! Constants used throughout the application
//!
//! This module centralizes table names, procedure names, notification text and
//! other constant values to improve maintainability and consistency.

// Tables
pub const TABLE_PROFILES: &str = "profiles";
pub const TABLE_NOTES: &str = "notes";
pub const TABLE_BOOKMARKS: &str = "bookmarks";
pub const TABLE_TODOS: &str = "todos";
pub const TABLE_REMINDERS: &str = "reminders";
pub const TABLE_ANNOUNCEMENTS: &str = "announcements";
pub const TABLE_SUBJECTS: &str = "subjects";
pub const TABLE_COURSES: &str = "courses";
pub const TABLE_NOTE_HISTORY: &str = "note_history";

// Stored procedures
pub const RPC_INCREMENT_DOWNLOAD_STATS: &str = "increment_download_stats";
pub const RPC_INCREMENT_LOGIN_COUNT: &str = "increment_login_count";

// Defaults
pub const DEFAULT_ADMIN_EMAIL: &str = "schedule.manager4@gmail.com";
pub const DEFAULT_STUDENT_EMAIL_DOMAIN: &str = "@gmail.com";
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
pub const DEFAULT_NOTES_BUCKET: &str = "notes";
pub const DEFAULT_AVATARS_BUCKET: &str = "avatars";
pub const DEFAULT_URL_ENV: &str = "SUPABASE_URL";
pub const DEFAULT_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Success Messages
pub const SUCCESS_SIGNED_UP: &str = "Signup successful! Please check your email for verification.";
pub const SUCCESS_LOGGED_OUT: &str = "Logged out successfully";
pub const SUCCESS_PASSWORD_UPDATED: &str = "Password updated successfully!";
pub const SUCCESS_RESET_EMAIL_SENT: &str = "Password reset link sent. Check your inbox.";
pub const SUCCESS_PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const SUCCESS_AVATAR_UPLOADED: &str = "Avatar uploaded successfully!";
pub const SUCCESS_NOTE_UPLOADED: &str = "Note uploaded successfully";
pub const SUCCESS_NOTE_DELETED: &str = "Note deleted successfully";
pub const SUCCESS_USER_UPDATED: &str = "User updated successfully";
pub const SUCCESS_USER_DELETED: &str = "User deleted successfully";
pub const SUCCESS_ANNOUNCEMENT_POSTED: &str = "Announcement posted successfully";
pub const SUCCESS_ANNOUNCEMENT_DELETED: &str = "Announcement deleted";
pub const SUCCESS_REMINDER_ADDED: &str = "Reminder added";

// Error Messages
pub const ERROR_ACCESS_DENIED: &str = "Access Denied: Admins only.";
pub const ERROR_TODO_ADD_FAILED: &str = "Failed to add task";
pub const ERROR_TODO_UPDATE_FAILED: &str = "Failed to update task";
pub const ERROR_TODO_DELETE_FAILED: &str = "Failed to delete task";
pub const ERROR_REMINDER_ADD_FAILED: &str = "Failed to add reminder";
pub const ERROR_REMINDER_DELETE_FAILED: &str = "Failed to delete reminder";
pub const ERROR_BOOKMARK_FAILED: &str = "Failed to update bookmark";
pub const ERROR_LOAD_FAILED: &str = "Failed to load data";


use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use backbenchers::auth::SessionStore;
use backbenchers::config::Config;
use backbenchers::constants::{SUCCESS_LOGGED_OUT, SUCCESS_RESET_EMAIL_SENT, SUCCESS_SIGNED_UP};
use backbenchers::entities::Note;
use backbenchers::filters::{NoteFilter, StatusFilter, SubjectFilter, ALL_CATEGORIES};
use backbenchers::planner::{self, Programme};
use backbenchers::routing::{self, RouteDecision};
use backbenchers::services::FeedPanel;
use backbenchers::state::Outcome;
use backbenchers::utils::datetime;
use backbenchers::{logger, Portal};

/// Command-line front end for the Poornima Backbenchers student portal.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Write a default configuration file
    InitConfig { path: Option<PathBuf> },
    /// Sign in
    Login { email: String, password: String },
    /// Create a student account
    Signup { name: String, email: String, password: String },
    /// Sign out
    Logout,
    /// Email a password reset link
    ResetPassword { email: String },
    /// Show the signed-in user
    Whoami,
    /// List notes (subject ALL for every subject)
    Notes { subject: Option<String>, search: Vec<String> },
    /// Download a note
    Download { note_id: String, out_file: Option<PathBuf> },
    /// List your to-dos
    Todos,
    /// Add a to-do
    TodoAdd {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Mark a to-do done or not done
    TodoToggle { id: String },
    /// List your reminders
    Reminders,
    /// Bookmark or un-bookmark a note
    Bookmark { note_id: String },
    /// List published courses
    Courses { search: Vec<String> },
    /// Show your home feed
    Feed,
    /// Show a weekly study plan (BCA, B.Tech, Other)
    Plan {
        #[arg(default_value = "Other")]
        programme: String,
    },
    /// Show which page a path leads to
    Route { path: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::InitConfig { path } => return init_config(path),
        Command::Plan { programme } => {
            print_plan(&programme);
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load()?;
    logger::init_logging(&config.logging)?;
    let portal = Portal::from_config(config)?;

    let store = SessionStore::new(SessionStore::default_path()?);
    if let Err(e) = store.restore(portal.backend().as_ref()).await {
        log::warn!("Ignoring saved session: {:#}", e);
        store.clear()?;
    }

    let result = dispatch(&portal, command).await;

    for toast in portal.notifier().drain() {
        println!("{}", toast);
    }
    store.persist(portal.backend().as_ref()).await?;
    result
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::get_default_config_path()?,
    };
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::generate_default_config(&path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}

async fn dispatch(portal: &Portal, command: Command) -> Result<()> {
    match command {
        Command::InitConfig { path } => init_config(path)?,
        Command::Plan { programme } => print_plan(&programme),
        Command::Login { email, password } => {
            let signed_in = portal.auth().sign_in(&email, &password).await?;
            let name = signed_in
                .profile
                .as_ref()
                .map(|p| p.display_name())
                .unwrap_or_else(|| signed_in.session.email().unwrap_or_default().to_string());
            println!("Welcome back, {}! Continue at {}", name, signed_in.route.path());
        }
        Command::Signup { name, email, password } => {
            let signed_up = portal.auth().sign_up(&name, &email, &password).await?;
            println!("{}", SUCCESS_SIGNED_UP);
            if !signed_up.verification_pending {
                println!("You are signed in.");
            }
        }
        Command::Logout => {
            portal.auth().sign_out().await?;
            println!("{}", SUCCESS_LOGGED_OUT);
        }
        Command::ResetPassword { email } => {
            portal.auth().request_password_reset(&email).await?;
            println!("{}", SUCCESS_RESET_EMAIL_SENT);
        }
        Command::Whoami => {
            let viewer = portal.auth().viewer().await;
            match (&viewer.user_id, &viewer.profile) {
                (None, _) => println!("Not signed in"),
                (Some(id), profile) => {
                    let role = if viewer.is_admin(&portal.config().auth) { "admin" } else { "student" };
                    let name = profile.as_ref().map(|p| p.display_name()).unwrap_or_default();
                    println!("{} <{}> ({}, {})", name, viewer.email.as_deref().unwrap_or("-"), role, id);
                }
            }
        }
        Command::Notes { subject, search } => {
            let filter = NoteFilter {
                subject: subject.as_deref().map(SubjectFilter::parse).unwrap_or_default(),
                status: StatusFilter::All,
                search: search.join(" "),
            };
            let notes = portal.notes().list_filtered(&filter).await?;
            if notes.is_empty() {
                println!("No notes found");
            }
            for note in &notes {
                print_note(note);
            }
        }
        Command::Download { note_id, out_file } => {
            let notes = portal.notes();
            let note = notes
                .get(&note_id)
                .await?
                .with_context(|| format!("Note {} not found", note_id))?;
            let session = portal.auth().current_session().await;
            let download = notes
                .download(&note, session.as_ref().map(|s| s.user_id()), true)
                .await?;
            let bytes = download.bytes.unwrap_or_default();
            let out = out_file.unwrap_or_else(|| PathBuf::from(default_file_name(&note)));
            write_download(&out, &bytes)?;
            println!("Saved {} ({} bytes)", out.display(), bytes.len());
        }
        Command::Todos => {
            let session = portal.auth().require_session().await?;
            let mut todos = portal.todos(session.user_id());
            todos.load().await.ensure("Loading to-dos")?;
            if todos.items().is_empty() {
                println!("Nothing to do");
            }
            for todo in todos.items() {
                println!("[{}] {}  {}", if todo.is_completed { "x" } else { " " }, todo.id, todo.task);
            }
        }
        Command::TodoAdd { text } => {
            let session = portal.auth().require_session().await?;
            let text = text.join(" ");
            let mut todos = portal.todos(session.user_id());
            match todos.add(&text).await.ensure("Adding to-do")? {
                Outcome::Ignored => bail!("Nothing to add"),
                _ => println!("Added: {}", text.trim()),
            }
        }
        Command::TodoToggle { id } => {
            let session = portal.auth().require_session().await?;
            let mut todos = portal.todos(session.user_id());
            todos.load().await.ensure("Loading to-dos")?;
            match todos.toggle(&id).await.ensure("Updating to-do")? {
                Outcome::Ignored => bail!("No to-do with id {}", id),
                _ => {
                    let done = todos.get(&id).is_some_and(|t| t.is_completed);
                    println!("{} marked {}", id, if done { "done" } else { "not done" });
                }
            }
        }
        Command::Reminders => {
            let session = portal.auth().require_session().await?;
            let mut reminders = portal.reminders(session.user_id());
            reminders.load().await.ensure("Loading reminders")?;
            if reminders.items().is_empty() {
                println!("No reminders");
            }
            for reminder in reminders.items() {
                println!(
                    "{}  {} [{}] {}",
                    reminder.id,
                    datetime::format_human_datetime(&reminder.reminder_date),
                    reminder.reminder_type.as_str(),
                    reminder.title
                );
            }
        }
        Command::Bookmark { note_id } => {
            let session = portal.auth().require_session().await?;
            let mut bookmarks = portal.bookmarks(session.user_id());
            bookmarks.load().await.ensure("Loading bookmarks")?;
            match bookmarks.toggle(&note_id).await.ensure("Bookmarking")? {
                Outcome::Ignored => bail!("Nothing to bookmark"),
                _ if bookmarks.contains(&note_id) => println!("Bookmarked {}", note_id),
                _ => println!("Removed bookmark {}", note_id),
            }
        }
        Command::Courses { search } => {
            let catalogue = portal.courses().catalogue(&search.join(" "), ALL_CATEGORIES).await?;
            println!("Categories: {}", catalogue.categories.join(", "));
            for course in &catalogue.courses {
                println!(
                    "{}  {} [{}] {}",
                    course.id,
                    course.title,
                    course.category().unwrap_or("General"),
                    course.link.as_deref().unwrap_or("")
                );
            }
        }
        Command::Feed => {
            let feed = portal.dashboard().feed(Utc::now()).await?;
            let name = feed.profile.as_ref().map(|p| p.display_name()).unwrap_or_default();
            println!("Hello, {}! Downloads: {}", name, feed.downloads);
            println!("\nRecent notes:");
            for note in &feed.recent_notes {
                print_note(note);
            }
            println!("\nNew courses:");
            for course in &feed.recent_courses {
                println!("  {} [{}]", course.title, course.category().unwrap_or("General"));
            }
            match &feed.panel {
                FeedPanel::Announcements(announcements) => {
                    println!("\nSystem alerts:");
                    for a in announcements {
                        println!("  [{}] {}: {}", a.announcement_type.as_str(), a.title, a.content);
                    }
                }
                FeedPanel::Upcoming(reminders) => {
                    println!("\nUpcoming:");
                    for r in reminders {
                        println!("  {} {}", datetime::format_human_datetime(&r.reminder_date), r.title);
                    }
                }
            }
        }
        Command::Route { path } => {
            let viewer = portal.auth().viewer().await;
            match routing::resolve(&path, &viewer, &portal.config().auth) {
                RouteDecision::Render(route) => println!("render {}", route.path()),
                RouteDecision::Redirect(route) => println!("redirect {}", route.path()),
            }
        }
    }
    Ok(())
}

fn write_download(out: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(out, bytes).with_context(|| format!("Failed to write {}", out.display()))
}

fn print_note(note: &Note) {
    let date = note
        .created_at
        .as_deref()
        .and_then(datetime::parse_timestamp)
        .map(|dt| datetime::format_relative_date(dt.with_timezone(&Local).date_naive(), Local::now().date_naive()))
        .unwrap_or_default();
    println!("  {}  [{}] {} ({}) {}", note.id, note.subject, note.title, note.status, date);
}

fn default_file_name(note: &Note) -> String {
    let extension = note
        .storage_path
        .as_deref()
        .and_then(|path| path.rsplit_once('.'))
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_else(|| "pdf".to_string());
    let stem: String = note
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.{}", if stem.is_empty() { "download".to_string() } else { stem }, extension)
}

fn print_plan(programme: &str) {
    let programme = Programme::parse(programme);
    println!("Study plan: {}", programme.label());
    for day in planner::weekly_plan(programme) {
        println!("  {:?}: {}", day.day, day.topics.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backbenchers::backend::{Backend, MemoryBackend};
    use serde_json::json;
    use std::sync::Arc;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("backbenchers").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    async fn signed_in_portal() -> (Arc<MemoryBackend>, Portal) {
        let backend = Arc::new(MemoryBackend::new());
        let mut config = Config::default();
        config.backend.backend_type = "memory".to_string();
        let portal = Portal::new(Arc::clone(&backend) as Arc<dyn Backend>, config);
        backend
            .create_account("asha@gmail.com", "secret123", json!({ "email": "asha@gmail.com" }))
            .await
            .unwrap();
        portal.auth().sign_in("asha@gmail.com", "secret123").await.unwrap();
        (backend, portal)
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(
            parse(&["login", "asha@gmail.com", "pw"]),
            Command::Login {
                email: "asha@gmail.com".to_string(),
                password: "pw".to_string()
            }
        );
        assert_eq!(
            parse(&["notes", "DBMS", "normal", "forms"]),
            Command::Notes {
                subject: Some("DBMS".to_string()),
                search: vec!["normal".to_string(), "forms".to_string()]
            }
        );
        assert_eq!(parse(&["init-config"]), Command::InitConfig { path: None });
        assert_eq!(
            parse(&["plan"]),
            Command::Plan {
                programme: "Other".to_string()
            }
        );
        assert_eq!(
            parse(&["todo-add", "read", "unit", "2"]),
            Command::TodoAdd {
                text: vec!["read".to_string(), "unit".to_string(), "2".to_string()]
            }
        );
    }

    #[test]
    fn test_parse_rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["backbenchers", "login", "asha@gmail.com"]).is_err());
        assert!(Cli::try_parse_from(["backbenchers", "todo-add"]).is_err());
        assert!(Cli::try_parse_from(["backbenchers", "unknown"]).is_err());
    }

    #[tokio::test]
    async fn test_todo_add_reports_failed_write() {
        let (backend, portal) = signed_in_portal().await;
        dispatch(&portal, parse(&["todo-add", "read", "unit", "2"])).await.unwrap();

        backend.fail_writes_to("todos").await;
        assert!(dispatch(&portal, parse(&["todo-add", "revise"])).await.is_err());
        assert_eq!(backend.rows("todos").await.len(), 1);
    }

    #[tokio::test]
    async fn test_bookmark_reports_reverted_toggle() {
        let (backend, portal) = signed_in_portal().await;
        backend.fail_writes_to("bookmarks").await;

        let err = dispatch(&portal, parse(&["bookmark", "n1"])).await.unwrap_err();
        assert!(err.to_string().contains("rolled back"));
        assert!(backend.rows("bookmarks").await.is_empty());
    }

    #[tokio::test]
    async fn test_todos_requires_session() {
        let backend = Arc::new(MemoryBackend::new());
        let portal = Portal::new(backend as Arc<dyn Backend>, Config::default());
        assert!(dispatch(&portal, Command::Todos).await.is_err());
    }
}

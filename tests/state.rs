mod common;

use backbenchers::constants::{ERROR_BOOKMARK_FAILED, ERROR_TODO_DELETE_FAILED, ERROR_TODO_UPDATE_FAILED};
use backbenchers::entities::ReminderType;
use backbenchers::notifications::ToastKind;
use backbenchers::state::Outcome;
use chrono::{Duration, Utc};
use common::{portal, seed_notes, signed_in_student};
use serde_json::json;

#[tokio::test]
async fn test_todos_add_toggle_delete() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut todos = portal.todos(&user_id);

    assert_eq!(todos.load().await, Outcome::Applied);
    assert!(todos.items().is_empty());

    assert_eq!(todos.add("  Revise DBMS  ").await, Outcome::Applied);
    assert_eq!(todos.add("Finish lab file").await, Outcome::Applied);
    assert_eq!(todos.add("   ").await, Outcome::Ignored);

    let tasks: Vec<&str> = todos.items().iter().map(|t| t.task.as_str()).collect();
    assert_eq!(tasks, vec!["Finish lab file", "Revise DBMS"]);

    let id = todos.items()[1].id.clone();
    assert_eq!(todos.toggle(&id).await, Outcome::Applied);
    assert!(todos.get(&id).unwrap().is_completed);
    assert_eq!(backend.rows("todos").await[0]["is_completed"], true);

    assert_eq!(todos.delete(&id).await, Outcome::Applied);
    assert_eq!(todos.items().len(), 1);
    assert_eq!(backend.rows("todos").await.len(), 1);

    assert_eq!(todos.toggle("missing").await, Outcome::Ignored);
}

#[tokio::test]
async fn test_todo_toggle_reverts_when_write_fails() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut todos = portal.todos(&user_id);
    todos.add("Revise DBMS").await;
    let id = todos.items()[0].id.clone();

    backend.fail_writes_to("todos").await;
    assert_eq!(todos.toggle(&id).await, Outcome::Reverted);
    assert!(!todos.get(&id).unwrap().is_completed);

    assert_eq!(todos.delete(&id).await, Outcome::Reverted);
    assert!(todos.get(&id).is_some());

    let toasts = portal.notifier().drain();
    let errors: Vec<&str> = toasts
        .iter()
        .filter(|t| t.kind == ToastKind::Error)
        .map(|t| t.message.as_str())
        .collect();
    assert_eq!(errors, vec![ERROR_TODO_UPDATE_FAILED, ERROR_TODO_DELETE_FAILED]);
}

#[tokio::test]
async fn test_todo_toggle_keeps_local_copy_when_reload_fails() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut todos = portal.todos(&user_id);
    todos.add("Revise DBMS").await;
    let id = todos.items()[0].id.clone();

    // A row added elsewhere would show up if the reload went through.
    backend.seed("todos", vec![json!({ "user_id": user_id, "task": "From phone" })]).await;
    backend.fail_writes_to("todos").await;
    backend.fail_reads_from("todos").await;

    assert_eq!(todos.toggle(&id).await, Outcome::Reverted);
    assert_eq!(todos.items().len(), 1);
    assert!(!todos.get(&id).unwrap().is_completed);

    assert_eq!(todos.delete(&id).await, Outcome::Reverted);
    assert_eq!(todos.items().len(), 1);
    assert_eq!(todos.load().await, Outcome::Failed);

    backend.restore_reads_from("todos").await;
    assert_eq!(todos.load().await, Outcome::Applied);
    assert_eq!(todos.items().len(), 2);
}

#[tokio::test]
async fn test_todos_are_per_user() {
    let (backend, portal) = portal();
    let asha = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    portal.todos(&asha).add("Mine").await;
    backend.seed("todos", vec![json!({ "user_id": "someone-else", "task": "Theirs" })]).await;

    let mut todos = portal.todos(&asha);
    todos.load().await;
    assert_eq!(todos.items().len(), 1);
    assert_eq!(todos.items()[0].task, "Mine");
}

#[tokio::test]
async fn test_reminders_sorted_and_upcoming() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut reminders = portal.reminders(&user_id);
    reminders.load().await;

    let now = Utc::now();
    let later = (now + Duration::days(10)).to_rfc3339();
    let sooner = (now + Duration::days(2)).to_rfc3339();
    let past = (now - Duration::days(3)).to_rfc3339();

    assert_eq!(reminders.add("Exam", &later, ReminderType::Exam).await, Outcome::Applied);
    assert_eq!(reminders.add("Assignment", &sooner, ReminderType::Assignment).await, Outcome::Applied);
    assert_eq!(reminders.add("Old", &past, ReminderType::Study).await, Outcome::Applied);

    let titles: Vec<&str> = reminders.items().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Old", "Assignment", "Exam"]);

    let upcoming: Vec<String> = reminders.upcoming(now, 3).into_iter().map(|r| r.title).collect();
    assert_eq!(upcoming, vec!["Assignment", "Exam"]);
}

#[tokio::test]
async fn test_reminder_missing_fields_are_ignored() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut reminders = portal.reminders(&user_id);

    assert_eq!(reminders.add("", "2030-01-01", ReminderType::Exam).await, Outcome::Ignored);
    assert_eq!(reminders.add("Exam", "  ", ReminderType::Exam).await, Outcome::Ignored);
    assert!(portal.notifier().drain().is_empty());

    assert_eq!(reminders.add("Exam", "next tuesday", ReminderType::Exam).await, Outcome::Ignored);
    let toasts = portal.notifier().drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(backend.rows("reminders").await.is_empty());
}

#[tokio::test]
async fn test_reminder_delete_reverts_when_write_fails() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut reminders = portal.reminders(&user_id);
    reminders.add("Exam", "2030-05-01T09:30", ReminderType::Exam).await;
    let id = reminders.items()[0].id.clone();

    backend.fail_writes_to("reminders").await;
    assert_eq!(reminders.delete(&id).await, Outcome::Reverted);
    assert_eq!(reminders.items().len(), 1);

    backend.restore_writes_to("reminders").await;
    assert_eq!(reminders.delete(&id).await, Outcome::Applied);
    assert!(reminders.items().is_empty());
}

#[tokio::test]
async fn test_reminder_delete_keeps_local_copy_when_reload_fails() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    let mut reminders = portal.reminders(&user_id);
    reminders.add("Exam", "2030-05-01T09:30", ReminderType::Exam).await;
    let id = reminders.items()[0].id.clone();

    let elsewhere = json!({ "user_id": user_id, "title": "Viva", "reminder_date": "2030-06-01T00:00:00Z" });
    backend.seed("reminders", vec![elsewhere]).await;
    backend.fail_writes_to("reminders").await;
    backend.fail_reads_from("reminders").await;

    assert_eq!(reminders.delete(&id).await, Outcome::Reverted);
    let titles: Vec<&str> = reminders.items().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Exam"]);
    assert_eq!(reminders.load().await, Outcome::Failed);
}

#[tokio::test]
async fn test_bookmark_toggle_and_revert() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    seed_notes(&backend, &[("n1", "Unit 1", "DBMS")]).await;

    let mut bookmarks = portal.bookmarks(&user_id);
    bookmarks.load().await;
    assert_eq!(bookmarks.toggle("n1").await, Outcome::Applied);
    assert!(bookmarks.contains("n1"));
    assert_eq!(backend.rows("bookmarks").await.len(), 1);

    backend.fail_writes_to("bookmarks").await;
    assert_eq!(bookmarks.toggle("n1").await, Outcome::Reverted);
    assert!(bookmarks.contains("n1"));
    let toasts = portal.notifier().drain();
    assert_eq!(toasts.last().map(|t| t.message.as_str()), Some(ERROR_BOOKMARK_FAILED));

    backend.restore_writes_to("bookmarks").await;
    assert_eq!(bookmarks.toggle("n1").await, Outcome::Applied);
    assert!(!bookmarks.contains("n1"));
    assert!(backend.rows("bookmarks").await.is_empty());
}

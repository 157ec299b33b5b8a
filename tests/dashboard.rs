mod common;

use backbenchers::backend::{Backend, Filter, MemoryBackend};
use backbenchers::counters::CounterUpdate;
use backbenchers::entities::ReminderType;
use backbenchers::services::FeedPanel;
use chrono::{Duration, Utc};
use common::{portal, seed_notes, signed_in_admin, signed_in_student};
use serde_json::json;

async fn seed_catalogue(backend: &MemoryBackend) {
    let notes: Vec<(String, String)> = (1..=7).map(|i| (format!("n{i}"), format!("Note {i}"))).collect();
    let rows: Vec<(&str, &str, &str)> = notes.iter().map(|(id, title)| (id.as_str(), title.as_str(), "DBMS")).collect();
    seed_notes(backend, &rows).await;

    backend.seed("subjects", vec![json!({ "id": "s1", "name": "Web" })]).await;
    let courses = (1..=6)
        .map(|i| json!({ "title": format!("Course {i}"), "subject_id": "s1", "is_published": i != 6 }))
        .collect();
    backend.seed("courses", courses).await;

    let announcements = (1..=4)
        .map(|i| json!({ "title": format!("Alert {i}"), "content": "...", "type": "info" }))
        .collect();
    backend.seed("announcements", announcements).await;
}

#[tokio::test]
async fn test_student_feed() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    seed_catalogue(&backend).await;

    let now = Utc::now();
    let mut reminders = portal.reminders(&user_id);
    for days in [-1, 1, 2, 3, 4] {
        let date = (now + Duration::days(days)).to_rfc3339();
        reminders.add(&format!("In {days} days"), &date, ReminderType::Study).await;
    }

    let feed = portal.dashboard().feed(now).await.unwrap();
    assert!(!feed.is_admin);

    let notes: Vec<&str> = feed.recent_notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(notes, vec!["n7", "n6", "n5", "n4", "n3"]);

    assert_eq!(feed.recent_courses.len(), 4);
    assert!(feed.recent_courses.iter().all(|c| c.is_published));
    assert_eq!(feed.recent_courses[0].title, "Course 5");

    match feed.panel {
        FeedPanel::Upcoming(upcoming) => {
            let titles: Vec<&str> = upcoming.iter().map(|r| r.title.as_str()).collect();
            assert_eq!(titles, vec!["In 1 days", "In 2 days", "In 3 days"]);
        }
        other => panic!("expected upcoming reminders, got {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_feed_shows_announcements() {
    let (backend, portal) = portal();
    signed_in_admin(&backend, &portal).await;
    seed_catalogue(&backend).await;

    let feed = portal.dashboard().feed(Utc::now()).await.unwrap();
    assert!(feed.is_admin);
    match feed.panel {
        FeedPanel::Announcements(announcements) => {
            let titles: Vec<&str> = announcements.iter().map(|a| a.title.as_str()).collect();
            assert_eq!(titles, vec!["Alert 4", "Alert 3"]);
        }
        other => panic!("expected announcements, got {:?}", other),
    }
}

#[tokio::test]
async fn test_feed_counts_downloads_from_history() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    seed_catalogue(&backend).await;

    let notes = portal.notes();
    for id in ["n1", "n2", "n1"] {
        let note = notes.get(id).await.unwrap().unwrap();
        let download = notes.download(&note, Some(&user_id), false).await.unwrap();
        assert!(download.history_recorded);
        assert_eq!(download.counter, Some(CounterUpdate::Rpc));
    }
    backend
        .seed("note_history", vec![json!({ "user_id": user_id, "note_id": "n3", "action_type": "view" })])
        .await;

    let feed = portal.dashboard().feed(Utc::now()).await.unwrap();
    assert_eq!(feed.downloads, 3);
    assert_eq!(feed.profile.unwrap().download_count, 3);
}

#[tokio::test]
async fn test_user_dashboard() {
    let (backend, portal) = portal();
    let user_id = signed_in_student(&backend, &portal, "asha@gmail.com").await;
    seed_notes(
        &backend,
        &[
            ("n1", "ER diagrams", "DBMS"),
            ("n2", "BCA Maths Unit 1", "Maths"),
            ("n3", "Trees", "DSA"),
            ("n4", "BCA C Programming", "C"),
        ],
    )
    .await;
    backend
        .update("profiles", &[Filter::eq("id", user_id.as_str())], json!({ "course": "bca" }))
        .await
        .unwrap();

    let mut bookmarks = portal.bookmarks(&user_id);
    bookmarks.toggle("n3").await;

    let notes = portal.notes();
    for id in ["n1", "n3", "n1"] {
        let note = notes.get(id).await.unwrap().unwrap();
        notes.download(&note, Some(&user_id), false).await.unwrap();
    }

    let dashboard = portal.dashboard().user_dashboard().await.unwrap();
    assert_eq!(dashboard.notes.len(), 4);
    assert!(dashboard.bookmarks.contains("n3"));
    assert_eq!(dashboard.saved.len(), 1);

    let recommended: Vec<&str> = dashboard.recommended.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(recommended, vec!["n4", "n2"]);

    let viewed: Vec<&str> = dashboard.recently_viewed.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(viewed, vec!["n1", "n3"]);
}

#[tokio::test]
async fn test_feed_requires_session() {
    let (_backend, portal) = portal();
    assert!(portal.dashboard().feed(Utc::now()).await.is_err());
    assert!(portal.dashboard().user_dashboard().await.is_err());
}

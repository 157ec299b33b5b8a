#![allow(dead_code)]

use std::sync::Arc;

use backbenchers::backend::{Backend, MemoryBackend};
use backbenchers::config::Config;
use backbenchers::Portal;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "schedule.manager4@gmail.com";
pub const PASSWORD: &str = "secret123";

/// A portal over a fresh in-memory backend, plus a handle to that backend.
pub fn portal() -> (Arc<MemoryBackend>, Portal) {
    let backend = Arc::new(MemoryBackend::new());
    let mut config = Config::default();
    config.backend.backend_type = "memory".to_string();
    let portal = Portal::new(Arc::clone(&backend) as Arc<dyn Backend>, config);
    (backend, portal)
}

pub async fn account(backend: &MemoryBackend, email: &str, profile: Value) -> String {
    backend
        .create_account(email, PASSWORD, profile)
        .await
        .expect("account should be created")
}

/// Create a student and sign them in. Returns the user id.
pub async fn signed_in_student(backend: &MemoryBackend, portal: &Portal, email: &str) -> String {
    let id = account(backend, email, json!({ "email": email, "full_name": "Test Student" })).await;
    portal.auth().sign_in(email, PASSWORD).await.expect("student sign-in");
    id
}

/// Create the configured admin account and sign it in. Returns the user id.
pub async fn signed_in_admin(backend: &MemoryBackend, portal: &Portal) -> String {
    let id = account(
        backend,
        ADMIN_EMAIL,
        json!({ "email": ADMIN_EMAIL, "full_name": "Admin", "role": "admin", "is_admin": true }),
    )
    .await;
    portal.auth().sign_in(ADMIN_EMAIL, PASSWORD).await.expect("admin sign-in");
    id
}

pub async fn seed_notes(backend: &MemoryBackend, notes: &[(&str, &str, &str)]) {
    let rows = notes
        .iter()
        .map(|(id, title, subject)| {
            json!({
                "id": id,
                "title": title,
                "subject": subject,
                "fileUrl": format!("memory://files/{}.pdf", id),
                "status": "approved",
            })
        })
        .collect();
    backend.seed("notes", rows).await;
}

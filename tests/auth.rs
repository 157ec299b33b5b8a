mod common;

use backbenchers::auth::SessionStore;
use backbenchers::backend::{Backend, MemoryBackend};
use backbenchers::counters::CounterUpdate;
use backbenchers::routing::{self, Route, RouteDecision};
use backbenchers::ValidationError;
use common::{account, portal, ADMIN_EMAIL, PASSWORD};
use serde_json::json;

fn validation_error(err: &anyhow::Error) -> Option<&ValidationError> {
    err.downcast_ref::<ValidationError>()
}

#[tokio::test]
async fn test_student_sign_in_lands_on_user_dashboard() {
    let (backend, portal) = portal();
    account(&backend, "asha@gmail.com", json!({ "email": "asha@gmail.com", "full_name": "Asha" })).await;

    let signed_in = portal.auth().sign_in("asha@gmail.com", PASSWORD).await.unwrap();
    assert_eq!(signed_in.route, Route::UserDashboard);
    assert_eq!(signed_in.login_count, CounterUpdate::Rpc);
    assert_eq!(signed_in.profile.unwrap().display_name(), "Asha");

    let profiles = backend.rows("profiles").await;
    assert_eq!(profiles[0]["login_count"], 1);
}

#[tokio::test]
async fn test_admin_email_lands_on_admin_dashboard_without_flag() {
    let (backend, portal) = portal();
    account(&backend, ADMIN_EMAIL, json!({})).await;

    let signed_in = portal.auth().sign_in(ADMIN_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(signed_in.route, Route::AdminDashboard);
}

#[tokio::test]
async fn test_admin_flag_lands_on_admin_dashboard() {
    let (backend, portal) = portal();
    account(&backend, "lecturer@gmail.com", json!({ "role": "admin", "is_admin": true })).await;

    let signed_in = portal.auth().sign_in("lecturer@gmail.com", PASSWORD).await.unwrap();
    assert_eq!(signed_in.route, Route::AdminDashboard);
}

#[tokio::test]
async fn test_sign_in_syncs_missing_profile_email() {
    let (backend, portal) = portal();
    account(&backend, "ravi@gmail.com", json!({})).await;
    assert!(backend.rows("profiles").await[0].get("email").is_none());

    let signed_in = portal.auth().sign_in("ravi@gmail.com", PASSWORD).await.unwrap();
    assert_eq!(signed_in.profile.unwrap().email.as_deref(), Some("ravi@gmail.com"));
    assert_eq!(backend.rows("profiles").await[0]["email"], "ravi@gmail.com");
}

#[tokio::test]
async fn test_blocked_account_is_signed_out() {
    let (backend, portal) = portal();
    account(&backend, "blocked@gmail.com", json!({ "blocked": true })).await;

    let err = portal.auth().sign_in("blocked@gmail.com", PASSWORD).await.unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::Blocked));
    assert!(backend.session().await.is_none());
    assert_eq!(backend.rows("profiles").await[0]["login_count"], 0);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let (backend, portal) = portal();
    account(&backend, "asha@gmail.com", json!({})).await;
    assert!(portal.auth().sign_in("asha@gmail.com", "nope").await.is_err());
    assert!(backend.session().await.is_none());
}

#[tokio::test]
async fn test_login_counter_falls_back_without_rpc() {
    let (backend, portal) = portal();
    account(&backend, "asha@gmail.com", json!({ "login_count": 4 })).await;
    backend.set_rpc_available(false).await;

    let signed_in = portal.auth().sign_in("asha@gmail.com", PASSWORD).await.unwrap();
    assert_eq!(signed_in.login_count, CounterUpdate::Fallback { value: 5 });
}

#[tokio::test]
async fn test_sign_up_enforces_student_domain() {
    let (backend, portal) = portal();

    let err = portal
        .auth()
        .sign_up("Someone", "someone@poornima.edu.in", PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only @gmail.com emails are allowed for students.");
    assert!(backend.rows("profiles").await.is_empty());

    // The administrator account is exempt from the domain rule.
    assert!(portal.auth().is_allowed_signup_email(ADMIN_EMAIL));
    assert!(portal.auth().is_allowed_signup_email("Student@GMAIL.com"));
}

#[tokio::test]
async fn test_sign_up_creates_profile_with_email() {
    let (backend, portal) = portal();

    let signed_up = portal.auth().sign_up("New Student", "new@gmail.com", PASSWORD).await.unwrap();
    assert!(!signed_up.verification_pending);
    assert!(signed_up.session.is_some());

    let profiles = backend.rows("profiles").await;
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["full_name"], "New Student");
    assert_eq!(profiles[0]["email"], "new@gmail.com");
    assert_eq!(profiles[0]["role"], "student");
}

#[tokio::test]
async fn test_sign_up_pending_verification() {
    let (backend, portal) = portal();
    backend.require_email_confirmation(true).await;

    let signed_up = portal.auth().sign_up("New Student", "new@gmail.com", PASSWORD).await.unwrap();
    assert!(signed_up.verification_pending);
    assert!(signed_up.session.is_none());
    assert!(backend.session().await.is_none());
}

#[tokio::test]
async fn test_update_password_requires_matching_confirmation() {
    let (backend, portal) = portal();
    account(&backend, "asha@gmail.com", json!({})).await;
    portal.auth().sign_in("asha@gmail.com", PASSWORD).await.unwrap();

    let err = portal.auth().update_password("newpass1", "newpass2").await.unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::PasswordMismatch));

    let err = portal.auth().update_password("abc", "abc").await.unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::PasswordTooShort { min: 6 }));

    portal.auth().update_password("newpass1", "newpass1").await.unwrap();
    portal.auth().sign_out().await.unwrap();
    assert!(portal.auth().sign_in("asha@gmail.com", PASSWORD).await.is_err());
    assert!(portal.auth().sign_in("asha@gmail.com", "newpass1").await.is_ok());
}

#[tokio::test]
async fn test_oauth_url_redirects_to_dashboard() {
    let (_backend, portal) = portal();
    let url = portal
        .auth()
        .oauth_url(backbenchers::backend::OAuthProvider::Google)
        .unwrap();
    assert!(url.contains("provider=google"));
    assert!(url.contains("user-dashboard"));
}

#[tokio::test]
async fn test_routes_follow_sign_in_state() {
    let (backend, portal) = portal();
    let auth_config = portal.config().auth.clone();

    let viewer = portal.auth().viewer().await;
    assert_eq!(
        routing::resolve("/user-dashboard", &viewer, &auth_config),
        RouteDecision::Redirect(Route::Login)
    );
    assert_eq!(routing::resolve("/", &viewer, &auth_config), RouteDecision::Render(Route::Landing));

    account(&backend, "asha@gmail.com", json!({})).await;
    portal.auth().sign_in("asha@gmail.com", PASSWORD).await.unwrap();
    let viewer = portal.auth().viewer().await;
    assert_eq!(routing::resolve("/", &viewer, &auth_config), RouteDecision::Render(Route::Feed));
    assert_eq!(
        routing::resolve("/admin-dashboard", &viewer, &auth_config),
        RouteDecision::Redirect(Route::UserDashboard)
    );
    assert_eq!(
        routing::resolve("/notes", &viewer, &auth_config),
        RouteDecision::Redirect(Route::UserDashboard)
    );

    portal.auth().sign_out().await.unwrap();
    let viewer = portal.auth().viewer().await;
    assert!(!viewer.is_signed_in());
}

#[tokio::test]
async fn test_session_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));

    let (backend, portal) = portal();
    account(&backend, "asha@gmail.com", json!({})).await;
    portal.auth().sign_in("asha@gmail.com", PASSWORD).await.unwrap();
    store.persist(backend.as_ref()).await.unwrap();

    let fresh = MemoryBackend::new();
    assert!(store.restore(&fresh).await.unwrap());
    let restored = fresh.session().await.unwrap();
    assert_eq!(restored.email(), Some("asha@gmail.com"));

    // Signing out and persisting again clears the file.
    portal.auth().sign_out().await.unwrap();
    store.persist(backend.as_ref()).await.unwrap();
    assert!(store.load().unwrap().is_none());
}

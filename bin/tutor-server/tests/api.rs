//! End-to-end API tests over the real router and an in-memory database.
//!
//! The completion provider is left unconfigured throughout, so every chat
//! turn exercises the fallback path — the server must still answer.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};

use tutor_server::config::Config;
use tutor_server::entities::SqliteStore;
use tutor_server::routes;
use tutor_server::state::AppState;

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_owned(),
        database_url: "sqlite::memory:".to_owned(),
        db_max_connections: 1,
        db_acquire_timeout_secs: 5,
        jwt_secret: "integration-test-secret".to_owned(),
        openrouter_api_key: None,
        openrouter_model: "test-model".to_owned(),
        openrouter_url: "http://127.0.0.1:9/unreachable".to_owned(),
        provider_timeout_secs: 1,
        cors_allowed_origins: None,
        enable_swagger: false,
        log_level: "info".to_owned(),
        log_json: false,
    }
}

async fn test_server() -> TestServer {
    let store = SqliteStore::connect("sqlite::memory:", 1, Duration::from_secs(5))
        .await
        .unwrap();
    let state = Arc::new(AppState::new(test_config(), store).unwrap());
    TestServer::new(routes::build(state)).unwrap()
}

/// Sign up a fresh user and return (user_id, token).
async fn signup(server: &TestServer, name: &str, email: &str, password: &str) -> (String, String) {
    let response = server
        .post("/api/signup")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    (
        body["userId"].as_str().unwrap().to_owned(),
        body["token"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
async fn health_reports_database_and_provider_state() {
    let server = test_server().await;

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["openRouterConfigured"], false);
}

#[tokio::test]
async fn signup_returns_user_and_token() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    assert!(!user_id.is_empty());
    assert!(!token.is_empty());
}

#[tokio::test]
async fn duplicate_email_conflicts_regardless_of_other_fields() {
    let server = test_server().await;
    signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .post("/api/signup")
        .json(&json!({ "name": "Other", "email": "ada@x.com", "password": "different-pass" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn signup_rejects_invalid_fields() {
    let server = test_server().await;

    let response = server
        .post("/api/signup")
        .json(&json!({ "name": "Ada", "email": "not-an-email", "password": "secret123" }))
        .await;
    response.assert_status_bad_request();

    let response = server
        .post("/api/signup")
        .json(&json!({ "name": "Ada", "email": "ada@x.com", "password": "short" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn login_succeeds_with_registered_credentials() {
    let server = test_server().await;
    let (user_id, _) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .post("/api/login")
        .json(&json!({ "email": "ada@x.com", "password": "secret123" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["userId"], user_id.as_str());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let server = test_server().await;
    signup(&server, "Ada", "ada@x.com", "secret123").await;

    let wrong_password = server
        .post("/api/login")
        .json(&json!({ "email": "ada@x.com", "password": "wrong-password" }))
        .await;
    wrong_password.assert_status_unauthorized();

    let unknown_email = server
        .post("/api/login")
        .json(&json!({ "email": "nobody@x.com", "password": "secret123" }))
        .await;
    unknown_email.assert_status_unauthorized();

    // Identical bodies: the response must not reveal whether the email exists.
    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let server = test_server().await;

    let missing = server.get("/api/history/some-user?subject=Biology").await;
    missing.assert_status_unauthorized();

    let invalid = server
        .get("/api/history/some-user?subject=Biology")
        .authorization_bearer("not-a-real-token")
        .await;
    invalid.assert_status_forbidden();
}

#[tokio::test]
async fn token_must_match_requested_user() {
    let server = test_server().await;
    let (_, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;
    let (other_id, _) = signup(&server, "Bob", "bob@x.com", "secret456").await;

    let response = server
        .get(&format!("/api/history/{other_id}?subject=Biology"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn chat_answers_without_a_provider() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "message": "What is entropy?",
            "subject": "Quantum Physics"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("error").is_none());

    let ai_response = body["aiResponse"].as_str().unwrap();
    assert!(!ai_response.is_empty());
    assert!(ai_response.contains("Quantum Physics"));

    // "What is entropy?" carries no polarity words.
    assert_eq!(body["sentiment"]["score"], 0.0);
    assert_eq!(body["sentiment"]["magnitude"], 0.0);
}

#[tokio::test]
async fn chat_rejects_unknown_subject() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "message": "hello",
            "subject": "Astrology"
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn chat_then_history_then_clear() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let chat = server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "message": "What is entropy?",
            "subject": "Quantum Physics"
        }))
        .await;
    chat.assert_status_ok();

    // History holds the user turn then the AI turn, oldest first.
    let history = server
        .get(&format!(
            "/api/history/{user_id}?subject=Quantum%20Physics"
        ))
        .authorization_bearer(&token)
        .await;
    history.assert_status_ok();

    let body: Value = history.json();
    let entries = body["history"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["role"], "user");
    assert_eq!(entries[0]["content"], "What is entropy?");
    assert_eq!(entries[1]["role"], "ai");

    // One mood entry, scored from the user's message.
    let moods = server
        .get(&format!("/api/moodlogs/{user_id}"))
        .authorization_bearer(&token)
        .await;
    moods.assert_status_ok();
    let body: Value = moods.json();
    let logs = body["moodLogs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["message"], "What is entropy?");
    assert_eq!(logs[0]["score"], 0.0);

    // Clearing empties both, and clearing again is still a success.
    let clear = server
        .delete(&format!("/api/clear-history/{user_id}"))
        .authorization_bearer(&token)
        .json(&json!({ "subject": "Quantum Physics" }))
        .await;
    clear.assert_status_ok();

    let history = server
        .get(&format!(
            "/api/history/{user_id}?subject=Quantum%20Physics"
        ))
        .authorization_bearer(&token)
        .await;
    let body: Value = history.json();
    assert!(body["history"].as_array().unwrap().is_empty());

    let clear_again = server
        .delete(&format!("/api/clear-history/{user_id}"))
        .authorization_bearer(&token)
        .json(&json!({ "subject": "Quantum Physics" }))
        .await;
    clear_again.assert_status_ok();
}

#[tokio::test]
async fn upload_is_acknowledged_and_scoped_to_subject() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .post("/api/upload-pdf-content")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "subject": "Chemistry",
            "fileName": "notes.pdf",
            "content": "The mole is the SI unit of amount of substance."
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("notes.pdf"));

    let empty = server
        .post("/api/upload-pdf-content")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "subject": "Chemistry",
            "fileName": "blank.pdf",
            "content": "   "
        }))
        .await;
    empty.assert_status_bad_request();
}

#[tokio::test]
async fn save_flag_round_trips_through_history() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({
            "userId": user_id,
            "message": "Explain osmosis",
            "subject": "Biology"
        }))
        .await
        .assert_status_ok();

    let history = server
        .get(&format!("/api/history/{user_id}?subject=Biology"))
        .authorization_bearer(&token)
        .await;
    let body: Value = history.json();
    let ai_message_id = body["history"][1]["id"].as_str().unwrap().to_owned();
    assert_eq!(body["history"][1]["saved"], false);

    server
        .post(&format!("/api/messages/{ai_message_id}/save"))
        .authorization_bearer(&token)
        .json(&json!({ "userId": user_id, "saved": true }))
        .await
        .assert_status_ok();

    let history = server
        .get(&format!("/api/history/{user_id}?subject=Biology"))
        .authorization_bearer(&token)
        .await;
    let body: Value = history.json();
    assert_eq!(body["history"][1]["saved"], true);

    let missing = server
        .post("/api/messages/no-such-id/save")
        .authorization_bearer(&token)
        .json(&json!({ "userId": user_id, "saved": true }))
        .await;
    missing.assert_status_not_found();
}

#[tokio::test]
async fn user_profile_omits_password_hash() {
    let server = test_server().await;
    let (user_id, token) = signup(&server, "Ada", "ada@x.com", "secret123").await;

    let response = server
        .get(&format!("/api/user/{user_id}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@x.com");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn subjects_are_listed_without_auth() {
    let server = test_server().await;

    let response = server.get("/api/subjects").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let subjects = body["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 8);
    assert!(subjects
        .iter()
        .any(|s| s["name"] == "Quantum Physics" && s["id"] == "quantum-physics"));
}

#[tokio::test]
async fn unknown_routes_return_json_not_found() {
    let server = test_server().await;

    let response = server.get("/api/no-such-route").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["error"], "not found");
}

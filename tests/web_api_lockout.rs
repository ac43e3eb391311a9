//! Web API Lockout Tests
//!
//! Progressive lockout driven through the HTTP surface with a manual clock.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use common::{create_test_app, create_user, login};

const ADDR: &str = "203.0.113.5";

#[tokio::test]
async fn test_three_failures_lock_then_lapse() {
    let app = create_test_app().await;
    create_user(&app.db, "alice", "hunter2", "Alice Example").await;

    // Three failures inside two minutes.
    for expected in 1..=3 {
        let response = login(&app.server, ADDR, "alice", "wrong").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["attempts"], expected);
        app.clock.advance(Duration::from_secs(1));
    }

    // Correct password is still refused while locked.
    let response = login(&app.server, ADDR, "alice", "hunter2").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["status"], "locked");
    assert_eq!(
        body["messages"]["error"],
        "Too many failed attempts. Please wait before trying again."
    );
    assert_eq!(body["attempts"], 3);
    assert_eq!(body["retry_after"], 59);

    app.clock.advance(Duration::from_secs(61));
    let response = login(&app.server, ADDR, "alice", "hunter2").await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["token"].is_string());

    // The success cleared the pair.
    let response = login(&app.server, ADDR, "alice", "wrong").await;
    assert_eq!(response.json::<Value>()["attempts"], 1);
}

#[tokio::test]
async fn test_third_failure_reports_lockout() {
    let app = create_test_app().await;

    for _ in 0..2 {
        login(&app.server, ADDR, "alice", "wrong").await;
    }
    let response = login(&app.server, ADDR, "alice", "wrong").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["retry_after"], 60);
}

#[tokio::test]
async fn test_tiers_escalate() {
    let app = create_test_app().await;

    // Each lockout is waited out before the next failure.
    let mut last = Value::Null;
    for _ in 0..6 {
        last = login(&app.server, ADDR, "alice", "wrong").await.json();
        app.clock.advance(Duration::from_secs(61));
    }
    assert_eq!(last["attempts"], 6);
    assert_eq!(last["retry_after"], 180);

    for _ in 0..3 {
        app.clock.advance(Duration::from_secs(180));
        last = login(&app.server, ADDR, "alice", "wrong").await.json();
    }
    assert_eq!(last["attempts"], 9);
    assert_eq!(last["retry_after"], 900);
}

#[tokio::test]
async fn test_lockout_is_per_address_and_username() {
    let app = create_test_app().await;
    create_user(&app.db, "alice", "hunter2", "Alice Example").await;
    create_user(&app.db, "bob", "s3cret", "Bob Example").await;

    for _ in 0..3 {
        login(&app.server, ADDR, "alice", "wrong").await;
    }
    login(&app.server, ADDR, "alice", "hunter2")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    login(&app.server, "198.51.100.7", "alice", "hunter2")
        .await
        .assert_status_ok();
    login(&app.server, ADDR, "bob", "s3cret")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_attempts_age_out_of_window() {
    let app = create_test_app().await;

    for _ in 0..2 {
        login(&app.server, ADDR, "alice", "wrong").await;
    }
    app.clock.advance(Duration::from_secs(31 * 60));

    let body: Value = login(&app.server, ADDR, "alice", "wrong").await.json();
    assert_eq!(body["attempts"], 1);
    assert_eq!(body["retry_after"], 0);
}

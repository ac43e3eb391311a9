//! Test helpers for Web API tests.
//!
//! Builds a router over an in-memory database with a manual clock and a
//! trusted `X-Forwarded-For`, so tests choose the client address per request.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use chrono::TimeZone;
use serde_json::{json, Value};

use flock::auth::LockoutPolicy;
use flock::clock::ManualClock;
use flock::web::{create_router, AppState};
use flock::{hash_password, Database, NewUser, Role, User, UserRepository};

/// Header carrying the simulated client address.
pub const FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Test harness.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub clock: ManualClock,
}

/// Create a test server with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let clock = ManualClock::new(chrono::Utc.with_ymd_and_hms(2026, 2, 12, 9, 0, 0).unwrap());

    let state = AppState::new(&db, Arc::new(clock.clone()), LockoutPolicy::default())
        .with_trust_forwarded_for(true);
    let router = create_router(Arc::new(state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, clock }
}

/// Provision a user with a hashed password.
pub async fn create_user(db: &Database, username: &str, password: &str, full_name: &str) -> User {
    let hash = hash_password(password).unwrap();
    UserRepository::new(db.pool())
        .create(&NewUser::new(username, hash, full_name).with_role(Role::Staff))
        .await
        .unwrap()
}

/// Provision a user whose password is still stored as plaintext.
pub async fn create_legacy_user(db: &Database, username: &str, password: &str) -> User {
    UserRepository::new(db.pool())
        .create(&NewUser::legacy(username, password, username))
        .await
        .unwrap()
}

/// POST /auth/login from `address`.
pub async fn login(
    server: &TestServer,
    address: &'static str,
    username: &str,
    password: &str,
) -> TestResponse {
    server
        .post("/auth/login")
        .add_header(FORWARDED_FOR, HeaderValue::from_static(address))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
}

/// Log in and return the issued token, asserting success.
pub async fn login_token(
    server: &TestServer,
    address: &'static str,
    username: &str,
    password: &str,
) -> String {
    let response = login(server, address, username, password).await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

/// `Authorization: Bearer <token>` header.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

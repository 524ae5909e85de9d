//! Integration tests for Cortado.
//!
//! # Running Tests
//!
//! The tests in `tests/` drive a live server end to end, so they are all
//! `#[ignore]`d by default. They require:
//!
//! - a running server: `cargo run -p cortado-server`
//! - a Supabase project with email auto-confirm enabled and the `orders`,
//!   `products`, and `baristas` tables
//! - `BARISTA_INVITE_CODE` in the environment, matching the server's
//!
//! ```bash
//! cargo test -p cortado-integration-tests -- --ignored
//! ```
//!
//! Tests create their own throwaway accounts and pick far-future pickup
//! windows, so repeated runs do not interfere with each other.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the server under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CORTADO_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// The invite code the server was started with.
#[must_use]
pub fn invite_code() -> String {
    std::env::var("BARISTA_INVITE_CODE")
        .expect("Set BARISTA_INVITE_CODE to match the running server")
}

/// A plain HTTP client.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// A unique throwaway email for this test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@cortado-tests.example", Uuid::new_v4().simple())
}

/// A pickup time in a window no other test run will touch: a uniformly
/// random 10-minute bucket within the next ~4 years, 3 minutes in.
#[must_use]
pub fn unique_pickup_time() -> DateTime<Utc> {
    let entropy = Uuid::new_v4().as_u128();
    let bucket = i64::try_from(entropy % (4 * 365 * 24 * 6)).expect("bounded");
    let base = Utc::now() + Duration::days(30);
    let aligned = base - Duration::milliseconds(base.timestamp_millis().rem_euclid(600_000));
    aligned + Duration::minutes(bucket * 10 + 3)
}

/// Sign up a fresh customer account; returns `(access_token, user_id)`.
///
/// # Panics
///
/// Panics when the server or Supabase rejects the signup, or when the
/// project does not auto-confirm emails (no session in the response).
pub async fn sign_up_customer(client: &reqwest::Client, email: &str) -> (String, String) {
    let resp = client
        .post(format!("{}/auth/signup", base_url()))
        .json(&json!({ "email": email, "password": "correct-horse-battery" }))
        .send()
        .await
        .expect("signup request failed");
    assert!(resp.status().is_success(), "signup rejected: {resp:?}");

    let body: Value = resp.json().await.expect("signup body");
    let token = body["session"]["access_token"]
        .as_str()
        .expect("no session in signup response; enable email auto-confirm")
        .to_owned();
    let user_id = body["user"]["id"].as_str().expect("user id").to_owned();
    (token, user_id)
}

/// Sign up a fresh barista account via the invite code; returns the access
/// token.
///
/// # Panics
///
/// Panics when the signup or the invite code is rejected.
pub async fn sign_up_barista(client: &reqwest::Client, email: &str) -> String {
    let resp = client
        .post(format!("{}/auth/barista-signup", base_url()))
        .json(&json!({
            "email": email,
            "password": "correct-horse-battery",
            "inviteCode": invite_code()
        }))
        .send()
        .await
        .expect("barista signup request failed");
    assert!(resp.status().is_success(), "barista signup rejected: {resp:?}");

    let body: Value = resp.json().await.expect("barista signup body");
    assert_eq!(body["isBarista"], true);
    body["session"]["access_token"]
        .as_str()
        .expect("no session in signup response; enable email auto-confirm")
        .to_owned()
}

/// Create an order; returns the response for the caller to assert on.
///
/// # Panics
///
/// Panics only when the request itself cannot be sent.
pub async fn create_order(
    client: &reqwest::Client,
    token: &str,
    pickup_time: DateTime<Utc>,
    total_items: u32,
    order_items: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "customer_name": "Integration Test",
            "pickup_time": pickup_time.to_rfc3339(),
            "total_items": total_items,
            "order_items": order_items
        }))
        .send()
        .await
        .expect("order request failed")
}

/// Fetch slot availability for a pickup time.
///
/// # Panics
///
/// Panics when the endpoint fails or answers with an unexpected shape.
pub async fn slot_availability(client: &reqwest::Client, pickup_time: DateTime<Utc>) -> Value {
    let resp = client
        .get(format!("{}/orders/slot-availability", base_url()))
        .query(&[("pickup_time", pickup_time.to_rfc3339())])
        .send()
        .await
        .expect("availability request failed");
    assert!(resp.status().is_success());
    resp.json().await.expect("availability body")
}

//! Integration tests for the auth proxy and role derivation.
//!
//! These tests require:
//! - The server running (cargo run -p cortado-server)
//! - A Supabase project with email auto-confirm enabled
//! - `BARISTA_INVITE_CODE` in the environment
//!
//! Run with: cargo test -p cortado-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use cortado_integration_tests::{
    base_url, client, invite_code, sign_up_barista, sign_up_customer, unique_email,
};

const PASSWORD: &str = "correct-horse-battery";

async fn me(client: &reqwest::Client, token: &str) -> Value {
    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("me failed");
    assert!(resp.status().is_success());
    resp.json().await.expect("me body")
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_signup_login_me_roundtrip() {
    let client = client();
    let email = unique_email("roundtrip");
    let (_, user_id) = sign_up_customer(&client, &email).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("login failed");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.expect("login body");
    assert_eq!(body["isBarista"], false);
    assert_eq!(body["user"]["id"], user_id.as_str());
    let token = body["session"]["access_token"].as_str().unwrap();

    let identity = me(&client, token).await;
    assert_eq!(identity["user"]["id"], user_id.as_str());
    assert_eq!(identity["user"]["email"], email.to_lowercase());
    assert_eq!(identity["isBarista"], false);
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_login_rejects_wrong_password() {
    let client = client();
    let email = unique_email("badpass");
    sign_up_customer(&client, &email).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("login failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_signup_rejects_weak_payloads() {
    let client = client();

    let cases = [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": unique_email("short"), "password": "five5" }),
        json!({ "password": PASSWORD }),
    ];
    for body in cases {
        let resp = client
            .post(format!("{}/auth/signup", base_url()))
            .json(&body)
            .send()
            .await
            .expect("signup failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {body}");
    }
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_refresh_rotates_session() {
    let client = client();
    let email = unique_email("refresh");
    sign_up_customer(&client, &email).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("login failed");
    let body: Value = resp.json().await.expect("login body");
    let refresh_token = body["session"]["refresh_token"].as_str().unwrap();

    let resp = client
        .post(format!("{}/auth/refresh", base_url()))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("refresh failed");
    assert!(resp.status().is_success());

    let refreshed: Value = resp.json().await.expect("refresh body");
    let new_token = refreshed["session"]["access_token"].as_str().unwrap();
    assert!(!new_token.is_empty());

    // The refreshed token works against an authenticated endpoint
    let identity = me(&client, new_token).await;
    assert_eq!(identity["user"]["email"], email.to_lowercase());
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_refresh_rejects_garbage_token() {
    let client = client();
    let resp = client
        .post(format!("{}/auth/refresh", base_url()))
        .json(&json!({ "refreshToken": "not-a-real-refresh-token" }))
        .send()
        .await
        .expect("refresh failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_me_rejects_missing_and_invalid_tokens() {
    let client = client();

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .send()
        .await
        .expect("me failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth("stale.or.forged")
        .send()
        .await
        .expect("me failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "Invalid or expired token");
}

// ============================================================================
// Barista provisioning
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_barista_signup_grants_role_immediately() {
    let client = client();
    let token = sign_up_barista(&client, &unique_email("provision")).await;

    let identity = me(&client, &token).await;
    assert_eq!(identity["isBarista"], true);
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_barista_signup_rejects_wrong_invite_code() {
    let client = client();
    let resp = client
        .post(format!("{}/auth/barista-signup", base_url()))
        .json(&json!({
            "email": unique_email("impostor"),
            "password": PASSWORD,
            "inviteCode": "definitely-wrong"
        }))
        .send()
        .await
        .expect("signup failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "Invalid invite code");
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_barista_grant_upgrades_existing_account() {
    let client = client();
    let email = unique_email("upgrade");
    let (token, _) = sign_up_customer(&client, &email).await;

    let identity = me(&client, &token).await;
    assert_eq!(identity["isBarista"], false);

    let resp = client
        .post(format!("{}/auth/barista-grant", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "inviteCode": invite_code() }))
        .send()
        .await
        .expect("grant failed");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.expect("grant body");
    assert_eq!(body["ok"], true);
    assert_eq!(body["isBarista"], true);

    // Role derivation picks the upsert up on the very next request
    let identity = me(&client, &token).await;
    assert_eq!(identity["isBarista"], true);
}

#[tokio::test]
#[ignore = "Requires running server and Supabase project"]
async fn test_barista_grant_requires_auth_and_code() {
    let client = client();

    // No token
    let resp = client
        .post(format!("{}/auth/barista-grant", base_url()))
        .json(&json!({ "inviteCode": invite_code() }))
        .send()
        .await
        .expect("grant failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong code
    let (token, _) = sign_up_customer(&client, &unique_email("wrong-code")).await;
    let resp = client
        .post(format!("{}/auth/barista-grant", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "inviteCode": "definitely-wrong" }))
        .send()
        .await
        .expect("grant failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

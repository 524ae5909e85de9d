//! Auth route handlers.
//!
//! Thin proxies over GoTrue plus the role-derivation step: every response
//! carries an `isBarista` flag so the apps can route to the right home
//! screen without a second request.

use axum::{Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use cortado_core::{Email, UserId};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::supabase::{AuthUser, Session, SupabaseError};

/// Email/password credentials.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: String,
}

/// Body for `POST /auth/barista-signup`.
#[derive(Debug, Deserialize)]
pub struct BaristaSignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "inviteCode")]
    pub invite_code: String,
}

/// Body for `POST /auth/barista-grant`.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    #[serde(default, rename = "inviteCode")]
    pub invite_code: String,
}

/// Response for signup/login/refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AuthUser,
    pub session: Option<Session>,
    pub is_barista: bool,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: MeUser,
    pub is_barista: bool,
}

/// The caller's identity as `GET /auth/me` reports it.
#[derive(Debug, Serialize)]
pub struct MeUser {
    pub id: UserId,
    pub email: Option<Email>,
}

/// Response for `POST /auth/barista-grant`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    pub ok: bool,
    pub is_barista: bool,
}

/// Register a new customer account.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Credentials>,
) -> Result<Json<AuthResponse>> {
    let email = validate_credentials(&payload)?;

    let outcome = state
        .auth()
        .sign_up(email.as_str(), &payload.password)
        .await
        .map_err(signup_error)?;

    let is_barista = derive_role(&state, outcome.user.email.as_deref()).await;

    Ok(Json(AuthResponse {
        user: outcome.user,
        session: outcome.session,
        is_barista,
    }))
}

/// Exchange email/password for a session.
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Credentials>,
) -> Result<Json<AuthResponse>> {
    let email = validate_credentials(&payload)?;

    let session = state
        .auth()
        .sign_in(email.as_str(), &payload.password)
        .await
        .map_err(credential_error)?;

    let is_barista = derive_role(&state, session.user.email.as_deref()).await;

    Ok(Json(AuthResponse {
        user: session.user.clone(),
        session: Some(session),
        is_barista,
    }))
}

/// Exchange a refresh token for a fresh session.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<AuthResponse>> {
    if payload.refresh_token.is_empty() {
        return Err(AppError::Validation("refreshToken is required".to_owned()));
    }

    let session = state
        .auth()
        .refresh(&payload.refresh_token)
        .await
        .map_err(credential_error)?;

    let is_barista = derive_role(&state, session.user.email.as_deref()).await;

    Ok(Json(AuthResponse {
        user: session.user.clone(),
        session: Some(session),
        is_barista,
    }))
}

/// Resolve the caller's identity and role.
pub async fn me(RequireAuth(caller): RequireAuth) -> Json<MeResponse> {
    Json(MeResponse {
        user: MeUser {
            id: caller.user_id,
            email: caller.email,
        },
        is_barista: caller.is_barista,
    })
}

/// Register a new account that is immediately a barista, gated by the
/// shared invite code.
pub async fn barista_signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BaristaSignupRequest>,
) -> Result<Json<AuthResponse>> {
    let credentials = Credentials {
        email: payload.email,
        password: payload.password,
    };
    let email = validate_credentials(&credentials)?;
    check_invite(
        state.config().barista_invite_code.as_ref(),
        &payload.invite_code,
    )?;

    let outcome = state
        .auth()
        .sign_up(email.as_str(), &credentials.password)
        .await
        .map_err(signup_error)?;

    if let Some(registered) = outcome.user.email.as_deref() {
        state
            .store()
            .upsert_barista(&registered.to_lowercase())
            .await?;
    }

    Ok(Json(AuthResponse {
        user: outcome.user,
        session: outcome.session,
        is_barista: true,
    }))
}

/// Grant the barista role to an existing, authenticated account.
pub async fn barista_grant(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    AppJson(payload): AppJson<GrantRequest>,
) -> Result<Json<GrantResponse>> {
    if payload.invite_code.is_empty() {
        return Err(AppError::Validation("inviteCode is required".to_owned()));
    }

    let email = caller
        .email
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_owned()))?;

    check_invite(
        state.config().barista_invite_code.as_ref(),
        &payload.invite_code,
    )?;

    state.store().upsert_barista(email.as_str()).await?;

    Ok(Json(GrantResponse {
        ok: true,
        is_barista: true,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate the credential payload, returning the normalized email.
fn validate_credentials(credentials: &Credentials) -> Result<Email> {
    let email =
        Email::parse(&credentials.email).map_err(|e| AppError::Validation(e.to_string()))?;
    if credentials.password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".to_owned(),
        ));
    }
    Ok(email)
}

/// An unset invite code disables barista self-provisioning entirely.
fn check_invite(configured: Option<&SecretString>, submitted: &str) -> Result<()> {
    match configured {
        Some(code) if code.expose_secret() == submitted => Ok(()),
        _ => Err(AppError::Forbidden("Invalid invite code".to_owned())),
    }
}

/// Derive the barista flag for an auth response.
async fn derive_role(state: &AppState, email: Option<&str>) -> bool {
    let normalized = email.map(str::to_lowercase);
    state
        .roles()
        .is_barista(state.store(), normalized.as_deref())
        .await
}

/// GoTrue rejections at signup are the caller's fault (taken email, weak
/// password), not an outage.
fn signup_error(err: SupabaseError) -> AppError {
    match err {
        SupabaseError::Api { message, .. } => AppError::Validation(message),
        other => other.into(),
    }
}

/// GoTrue rejections at login/refresh mean bad credentials.
fn credential_error(err: SupabaseError) -> AppError {
    match err {
        SupabaseError::Api { message, .. } => AppError::Unauthorized(message),
        other => other.into(),
    }
}

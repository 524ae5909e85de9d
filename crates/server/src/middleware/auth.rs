//! Authentication extractors.
//!
//! Every authenticated request carries a Supabase access token in the
//! `Authorization: Bearer ...` header. The extractors resolve it against
//! GoTrue and derive the barista role fresh on each request - the identity
//! provider and the role lookup are deliberately on the hot path, so a
//! revoked token or role change takes effect immediately.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use cortado_core::{Email, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// The resolved caller of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    /// Normalized (lowercased) email, when the identity has one.
    pub email: Option<Email>,
    pub is_barista: bool,
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(caller): RequireAuth) -> impl IntoResponse {
///     format!("hello, {}", caller.user_id)
/// }
/// ```
pub struct RequireAuth(pub AuthContext);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization token".to_owned()))?;
        let context = resolve_context(state, token).await?;
        Ok(Self(context))
    }
}

/// Extractor that treats a missing token as anonymous.
///
/// A token that is present but invalid still fails the request - silently
/// downgrading a barista to an anonymous catalog view would mask expired
/// sessions.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(Self(None)),
            Some(token) => resolve_context(state, token).await.map(|c| Self(Some(c))),
        }
    }
}

/// Extractor that requires a valid bearer token AND the barista role.
pub struct RequireBarista(pub AuthContext);

impl FromRequestParts<AppState> for RequireBarista {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(context) = RequireAuth::from_request_parts(parts, state).await?;
        if !context.is_barista {
            return Err(AppError::Forbidden("Barista access only".to_owned()));
        }
        Ok(Self(context))
    }
}

/// Extract the bearer token from the `Authorization` header, if any.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve a token to its user and derive the barista role.
async fn resolve_context(state: &AppState, token: &str) -> Result<AuthContext, AppError> {
    let user = state.auth().get_user(token).await.map_err(|error| {
        tracing::debug!(%error, "token resolution failed");
        AppError::Unauthorized("Invalid or expired token".to_owned())
    })?;

    let email = user.email.as_deref().and_then(|raw| Email::parse(raw).ok());
    let is_barista = state
        .roles()
        .is_barista(state.store(), email.as_ref().map(Email::as_str))
        .await;

    Ok(AuthContext {
        user_id: user.id,
        email,
        is_barista,
    })
}

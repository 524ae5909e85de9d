//! GoTrue identity-provider client.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use cortado_core::UserId;

use super::{SupabaseError, error_message};
use crate::config::SupabaseConfig;

/// A Supabase auth user, trimmed to the fields the apps consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Auth user id; doubles as the order owner id.
    pub id: UserId,
    /// May be absent for phone-only identities.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An access/refresh token pair issued by GoTrue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Result of a signup: a session when the project auto-confirms emails,
/// otherwise just the pending user.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Client for the GoTrue auth API.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    endpoint: String,
    service_role_key: String,
}

impl AuthClient {
    /// Create a new GoTrue client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                endpoint: format!("{}/auth/v1", config.url),
                service_role_key: config.service_role_key.expose_secret().to_string(),
            }),
        }
    }

    /// Register a new email/password identity.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` when GoTrue rejects the signup (e.g. the
    /// email is already registered).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let body = self
            .post("/signup", &json!({ "email": email, "password": password }))
            .await?;

        // Auto-confirm projects answer with a full session, confirm-required
        // projects with a bare user object.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(body)?;
            Ok(SignUpOutcome {
                user,
                session: None,
            })
        }
    }

    /// Exchange email/password credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` for wrong credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SupabaseError> {
        let body = self
            .post(
                "/token?grant_type=password",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Exchange a refresh token for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` for revoked or unknown refresh tokens.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        let body = self
            .post(
                "/token?grant_type=refresh_token",
                &json!({ "refresh_token": refresh_token }),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Resolve a caller's access token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` for invalid or expired tokens.
    #[instrument(skip(self, access_token))]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let response = self
            .inner
            .client
            .get(format!("{}/user", self.inner.endpoint))
            .header("apikey", &self.inner.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Liveness probe against GoTrue, used by the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the auth service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .client
            .get(format!("{}/health", self.inner.endpoint))
            .header("apikey", &self.inner.service_role_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(())
    }

    /// POST a JSON body to a GoTrue path and return the decoded response.
    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SupabaseError> {
        let response = self
            .inner
            .client
            .post(format!("{}{path}", self.inner.endpoint))
            .header("apikey", &self.inner.service_role_key)
            .bearer_auth(&self.inner.service_role_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_parses_gotrue_token_response() {
        let json = serde_json::json!({
            "access_token": "header.payload.sig",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_754_600_000,
            "refresh_token": "refresh-abc",
            "user": {
                "id": "7f3c1d8e-0000-4000-8000-000000000001",
                "aud": "authenticated",
                "email": "customer@example.com",
                "created_at": "2026-08-01T09:00:00.000000Z"
            }
        });

        let session: Session = serde_json::from_value(json).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user.email.as_deref(), Some("customer@example.com"));
    }

    #[test]
    fn test_auth_user_tolerates_missing_email() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "7f3c1d8e-0000-4000-8000-000000000002"
        }))
        .unwrap();
        assert!(user.email.is_none());
    }
}

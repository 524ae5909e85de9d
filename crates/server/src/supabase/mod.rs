//! Supabase API clients.
//!
//! # Architecture
//!
//! - `reqwest` + JSON against the project's REST surface - no SDK
//! - Supabase is the source of truth - NO local sync, direct API calls
//! - No caching: every request re-reads the rows it needs
//!
//! # APIs
//!
//! ## GoTrue (`/auth/v1`)
//! - Signup, password login, token refresh, token-to-user resolution
//! - [`AuthClient`]
//!
//! ## PostgREST (`/rest/v1`)
//! - Row operations on `orders`, `products`, and `baristas`
//! - Equality/range/in filters, ordering, limits
//! - [`StoreClient`]
//!
//! Both clients authenticate with the service-role key; callers' bearer
//! tokens are only ever forwarded to GoTrue for identity resolution.

mod auth;
mod store;

pub use auth::{AuthClient, AuthUser, Session, SignUpOutcome};
pub use store::{ProductFilter, SlotOrder, StoreClient};

use thiserror::Error;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A single-row request matched no rows.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Pull a human-readable message out of a Supabase error body.
///
/// GoTrue and PostgREST disagree on the field name (`msg`, `message`,
/// `error_description`, `error`), so try them in order before falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(serde_json::Value::as_str) {
                return message.to_owned();
            }
        }
    }

    let trimmed: String = body.chars().take(200).collect();
    if trimmed.is_empty() {
        "(empty error body)".to_owned()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_gotrue_shape() {
        assert_eq!(
            error_message(r#"{"code":400,"msg":"User already registered"}"#),
            "User already registered"
        );
    }

    #[test]
    fn test_error_message_postgrest_shape() {
        assert_eq!(
            error_message(
                r#"{"code":"PGRST116","details":null,"hint":null,"message":"JSON object requested"}"#
            ),
            "JSON object requested"
        );
    }

    #[test]
    fn test_error_message_oauth_shape() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#),
            "Invalid Refresh Token"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
        assert_eq!(error_message(""), "(empty error body)");
    }

    #[test]
    fn test_supabase_error_display() {
        let err = SupabaseError::Api {
            status: 409,
            message: "duplicate key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 409): duplicate key");

        let err = SupabaseError::NotFound("order".to_string());
        assert_eq!(err.to_string(), "Not found: order");
    }
}

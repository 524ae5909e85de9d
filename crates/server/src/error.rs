//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures dependency failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; every response body is `{"error": ..., "code": ...}`
//! so clients can branch on a stable reason string.

use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::slots::SlotFull;
use crate::supabase::SupabaseError;

/// Application-level error type for the ordering backend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing request fields.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the barista role.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced order/product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The pickup slot cannot take more coffee items.
    #[error("Pickup slot is full. Please choose another time.")]
    SlotFull,

    /// Supabase (store or identity provider) failed.
    #[error("Supabase error: {0}")]
    Dependency(SupabaseError),
}

impl AppError {
    /// Stable machine-checkable reason string for the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::SlotFull => "slot_full",
            Self::Dependency(_) => "dependency",
        }
    }
}

impl From<SupabaseError> for AppError {
    fn from(err: SupabaseError) -> Self {
        match err {
            // A single-row lookup that matched nothing is the caller's
            // problem, not an outage.
            SupabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Dependency(other),
        }
    }
}

impl From<SlotFull> for AppError {
    fn from(_: SlotFull) -> Self {
        Self::SlotFull
    }
}

/// JSON error body returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture dependency failures to Sentry
        if matches!(self, Self::Dependency(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SlotFull => StatusCode::CONFLICT,
            Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            // Surface the store's message (matching the deployed API), but
            // never connection/parse internals.
            Self::Dependency(SupabaseError::Api { message, .. }) => message.clone(),
            Self::Dependency(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: message,
            code: self.code(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON extractor whose rejection is an [`AppError::Validation`].
///
/// Axum's stock `Json` rejection responds with plain text and a mix of
/// 400/415/422; wrapping it keeps the error contract uniform.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

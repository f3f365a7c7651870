//! Error types for the directory API boundary.
//!
//! Everything that can go wrong before or during an HTTP call is an
//! `ApiError`. The store layer never sees this type: engines convert each
//! failure to a display string (server-provided message when the response
//! body carried one, per-operation fallback otherwise) before it lands in a
//! store's `error` field.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the `{ "message": ... }` field from
    /// the error body when the server supplied one.
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// 2xx response whose body did not match the `{ success, data }`
    /// envelope, or carried `success: false`.
    #[error("Malformed response envelope: {0}")]
    Envelope(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bearer token expired or revoked")]
    AuthExpired,

    #[error("Token not found at {0}")]
    TokenNotFound(PathBuf),

    /// Client-side validation failure raised before any network call.
    #[error("No organization selected")]
    MissingOrganization,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// The message shown to the user: the server's own `message` when the
    /// failure carried one, the validation text for pre-network failures,
    /// otherwise the per-operation fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            ApiError::MissingOrganization => self.to_string(),
            ApiError::AuthExpired => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// True when re-authentication (not a retry of the action) is needed.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::AuthExpired | ApiError::Api { status: 401, .. }
        )
    }
}

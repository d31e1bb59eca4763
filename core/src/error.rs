//! Error types for the expense API client.
//!
//! # Design
//! One variant per failure kind a caller reacts to differently. Business
//! failures carry the server's `message` when it sent one; `user_message`
//! falls back to a fixed string per kind so the UI always has something to
//! show. The client never presents errors itself.

use thiserror::Error;

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received: connect failure, DNS, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with an HTTP status other than 200 or 401.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The session is no longer valid and has been cleared.
    #[error("session expired: {}", or_fallback(.message, SESSION_EXPIRED))]
    SessionExpired { message: Option<String> },

    /// A refresh was needed but no token was stored.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("forbidden: {}", or_fallback(.message, FORBIDDEN))]
    Forbidden { message: Option<String> },

    #[error("not found: {}", or_fallback(.message, NOT_FOUND))]
    NotFound { message: Option<String> },

    #[error("invalid params: {}", or_fallback(.message, INVALID_PARAMS))]
    InvalidParams { message: Option<String> },

    #[error("server error: {}", or_fallback(.message, SERVER_ERROR))]
    Server { message: Option<String> },

    /// A business code outside the known set.
    #[error("api error {code}: {}", or_fallback(.message, REQUEST_FAILED))]
    UnknownApi { code: i64, message: Option<String> },

    /// The request descriptor was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A date argument was out of range.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

const NETWORK_FAILED: &str = "Network request failed";
const NOT_AUTHENTICATED: &str = "Please log in first";
const SESSION_EXPIRED: &str = "Session expired, please log in again";
const FORBIDDEN: &str = "Access denied";
const NOT_FOUND: &str = "Requested resource does not exist";
const INVALID_PARAMS: &str = "Invalid parameters";
const SERVER_ERROR: &str = "Server error";
const REQUEST_FAILED: &str = "Request failed";

fn or_fallback<'a>(message: &'a Option<String>, fallback: &'a str) -> &'a str {
    message.as_deref().filter(|m| !m.is_empty()).unwrap_or(fallback)
}

impl ApiError {
    /// Human-readable text for a toast: the server message when present,
    /// otherwise a generic string for the kind.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Network(_) => NETWORK_FAILED,
            ApiError::NotAuthenticated => NOT_AUTHENTICATED,
            ApiError::SessionExpired { message } => or_fallback(message, SESSION_EXPIRED),
            ApiError::Forbidden { message } => or_fallback(message, FORBIDDEN),
            ApiError::NotFound { message } => or_fallback(message, NOT_FOUND),
            ApiError::InvalidParams { message } => or_fallback(message, INVALID_PARAMS),
            ApiError::Server { message } => or_fallback(message, SERVER_ERROR),
            ApiError::UnknownApi { message, .. } => or_fallback(message, REQUEST_FAILED),
            ApiError::Http { .. }
            | ApiError::InvalidRequest(_)
            | ApiError::InvalidDate(_)
            | ApiError::Serialization(_)
            | ApiError::Deserialization(_) => REQUEST_FAILED,
        }
    }

    /// Whether the caller should be sent back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. } | ApiError::NotAuthenticated)
    }
}

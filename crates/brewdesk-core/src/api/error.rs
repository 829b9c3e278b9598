use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Every way a backend call can fail, one variant per reaction.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Bad request: {}", .detail.as_deref().unwrap_or("no detail"))]
    BadRequest { detail: Option<String> },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request could not be prepared: {0}")]
    Local(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const FORBIDDEN_MESSAGE: &str = "Access denied. You do not have permission.";
pub const BAD_REQUEST_MESSAGE: &str = "Bad request";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable `detail` out of an error body.
    ///
    /// Accepts `{"detail": "text"}` and validation lists of the form
    /// `{"detail": [{"msg": "..."}, ...]}`.
    pub fn detail_from_body(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }

    pub fn from_status(status: StatusCode, path: &str, body: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::BadRequest {
                detail: Self::detail_from_body(body),
            },
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(Self::truncate_body(body)),
            404 => ApiError::NotFound {
                path: path.to_string(),
            },
            500 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::Status {
                status,
                detail: Self::detail_from_body(body),
            },
        }
    }

    /// Classify a failure from the HTTP stack itself (nothing, or nothing
    /// usable, came back)
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_builder() {
            ApiError::Local(error.to_string())
        } else if error.is_decode() {
            ApiError::InvalidResponse(error.to_string())
        } else {
            ApiError::Network(error)
        }
    }

    /// The notification shown to the user for this failure, if any.
    /// `Unauthorized` is handled separately because it also ends the session.
    pub fn notification_message(&self) -> Option<String> {
        match self {
            ApiError::Timeout => Some(TIMEOUT_MESSAGE.to_string()),
            ApiError::Unauthorized => Some(SESSION_EXPIRED_MESSAGE.to_string()),
            ApiError::Forbidden(_) => Some(FORBIDDEN_MESSAGE.to_string()),
            ApiError::NotFound { path } => Some(format!("Endpoint not found: {}", path)),
            ApiError::BadRequest { detail } => Some(
                detail
                    .clone()
                    .unwrap_or_else(|| BAD_REQUEST_MESSAGE.to_string()),
            ),
            ApiError::ServerError(_) => Some(SERVER_ERROR_MESSAGE.to_string()),
            ApiError::Status { .. } => None,
            ApiError::Network(_) => Some(NETWORK_ERROR_MESSAGE.to_string()),
            ApiError::Local(_) | ApiError::InvalidResponse(_) => {
                Some(UNEXPECTED_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// HTTP status behind this error, when the backend answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            ApiError::ServerError(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

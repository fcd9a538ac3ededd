//! Error types for Harbor API calls

use thiserror::Error;

/// Harbor client errors
#[derive(Debug, Error)]
pub enum HarborError {
    // ============ Remote Errors ============
    #[error("Harbor API error: {status} - {body}")]
    Api { status: u16, body: String },

    // ============ Network Errors ============
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout")]
    Timeout,

    // ============ Configuration Errors ============
    #[error("Invalid Harbor URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    // ============ Response Errors ============
    #[error("Harbor did not return the ID of the created {resource}")]
    MissingId { resource: String },

    #[error("Too many pages listing {path} (max {max})")]
    TooManyPages { path: String, max: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ============ Other ============
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for Harbor operations
pub type Result<T> = std::result::Result<T, HarborError>;

impl HarborError {
    /// HTTP status of a classified API error
    pub fn status(&self) -> Option<u16> {
        match self {
            HarborError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Check if the credentials were rejected (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for HarborError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HarborError::Timeout
        } else if e.is_connect() {
            HarborError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if e.is_decode() {
            HarborError::Serialization(e.to_string())
        } else if let Some(status) = e.status() {
            HarborError::Api {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            HarborError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for HarborError {
    fn from(e: serde_json::Error) -> Self {
        HarborError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for HarborError {
    fn from(e: url::ParseError) -> Self {
        HarborError::InvalidUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

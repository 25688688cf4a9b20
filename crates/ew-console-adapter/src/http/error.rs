/*
[INPUT]:  Error sources (HTTP, identity provider, SDK bridge, serialization, token signing)
[OUTPUT]: Structured error types with stable names and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the console adapter
#[derive(Error, Debug)]
pub enum AdapterError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Identity provider refused or failed the credential exchange
    #[error("Auth exchange failed: {message}")]
    AuthExchange { message: String },

    /// SDK bridge rejected a call
    #[error("{name}: {message}")]
    Sdk { name: String, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signing a custom token or assertion failed
    #[error("Token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Stable identifier shown in failure panels
    pub fn name(&self) -> &str {
        match self {
            AdapterError::Http(_) => "HttpError",
            AdapterError::AuthExchange { .. } => "AuthExchangeError",
            AdapterError::Sdk { name, .. } => name,
            AdapterError::Serialization(_) => "SerializationError",
            AdapterError::UrlParse(_) => "UrlParseError",
            AdapterError::InvalidResponse(_) => "InvalidResponseError",
            AdapterError::Config(_) => "ConfigError",
            AdapterError::TokenSigning(_) => "TokenSigningError",
            AdapterError::Io(_) => "IoError",
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdapterError::Http(_) | AdapterError::InvalidResponse(_)
        )
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AdapterError::AuthExchange { .. } | AdapterError::TokenSigning(_)
        )
    }

    /// Build an auth exchange error from any displayable detail
    pub fn auth_exchange(message: impl Into<String>) -> Self {
        AdapterError::AuthExchange {
            message: message.into(),
        }
    }

    /// Build an SDK error from a non-success HTTP status
    pub fn sdk_status(status: StatusCode, message: impl Into<String>) -> Self {
        AdapterError::Sdk {
            name: format!("HTTP {}", status.as_u16()),
            message: message.into(),
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

//! Error types for provider adapters

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building an adapter.
///
/// This is the only error kind that leaves a constructor; every failure after
/// construction is absorbed into a fallback record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required setting has no value
    #[error("Missing required setting {setting} for provider {provider}")]
    MissingSetting {
        /// Provider display name
        provider: String,
        /// Environment or config key that must be set
        setting: String,
    },

    /// A setting has a value outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Provider key is not known
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    /// Failed to parse a TOML document
    #[error("Failed to parse TOML: {0}")]
    Toml(String),
}

/// Errors raised by a single provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP 429
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        /// Response body or status text
        message: String,
        /// Delay requested by the server
        retry_after: Option<Duration>,
    },

    /// HTTP 5xx
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Request exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established or was dropped
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401 or 403
    #[error("Authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Other HTTP 4xx
    #[error("Bad request ({status}): {message}")]
    BadRequest {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response did not contain events in any accepted shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Response carried no content at all
    #[error("Empty response from provider")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Server { .. }
                | ProviderError::Timeout(_)
                | ProviderError::Network(_)
        )
    }

    /// Whether the error came from decoding the response
    pub fn is_parse(&self) -> bool {
        matches!(self, ProviderError::Parse(_) | ProviderError::EmptyResponse)
    }

    /// Server requested delay before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ProviderError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(
        status: u16,
        message: impl Into<String>,
        retry_after: Option<Duration>,
    ) -> Self {
        let message = message.into();
        match status {
            429 => ProviderError::RateLimited {
                message,
                retry_after,
            },
            408 => ProviderError::Timeout(format!("HTTP 408: {}", message)),
            401 | 403 => ProviderError::Authentication { status, message },
            500..=599 => ProviderError::Server { status, message },
            _ => ProviderError::BadRequest { status, message },
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

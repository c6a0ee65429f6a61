//! Error types for draftpad.

use std::time::Duration;

/// Failure of a single text-generation request.
///
/// These never reach the presentation layer: the assist session logs them and
/// replaces them with a fixed fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request task ended unexpectedly: {0}")]
    Aborted(String),
}

impl AssistError {
    pub(crate) fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| AssistError::Http { provider, source }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing API key for {provider}. Set {env_var} or add it to the config file")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Unknown provider '{name}', expected one of: {expected}")]
    UnknownProvider { name: String, expected: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

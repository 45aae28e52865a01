use thiserror::Error;

use crate::core::fetch::FetchError;

/// Caller-supplied input was rejected. The message is written for the
/// calling model, so it is surfaced verbatim as tool output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolValidationError {
    message: String,
}

impl ToolValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A required process-wide setting is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required configuration `{0}`; set it before issuing weather requests")]
    Missing(&'static str),
}

/// Everything a tool can fail with. Only `Validation` is recovered into text
/// by the base template; every other variant propagates to the transport.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ToolValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("upstream response from {url} is missing `{field}`")]
    MissingField { field: String, url: String },

    /// Validated params no longer fit the workflow's typed args.
    #[error("internal tool error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(ToolValidationError::new(message))
    }

    pub fn missing_field(field: impl Into<String>, url: impl Into<String>) -> Self {
        ToolError::MissingField { field: field.into(), url: url.into() }
    }

    pub fn as_validation(&self) -> Option<&ToolValidationError> {
        match self {
            ToolError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

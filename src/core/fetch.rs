//! HTTP fetch capability injected into tools.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("response from {url} is not valid JSON: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    /// Transport failures and 5xx statuses may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Transport { .. } => true,
            FetchError::Decode { .. } => false,
        }
    }
}

/// Fetches a JSON document. `user_agent` is the identification header value
/// the weather API requires on every request.
#[async_trait]
pub trait JsonFetch: Send + Sync {
    async fn get_json(&self, url: &str, user_agent: &str) -> Result<JsonValue, FetchError>;
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by full URL; records every call.
    #[derive(Default)]
    pub struct StubFetch {
        responses: HashMap<String, Result<JsonValue, FetchError>>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl StubFetch {
        pub fn with(mut self, url: &str, body: JsonValue) -> Self {
            self.responses.insert(url.to_string(), Ok(body));
            self
        }

        pub fn failing(mut self, url: &str, err: FetchError) -> Self {
            self.responses.insert(url.to_string(), Err(err));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl JsonFetch for StubFetch {
        async fn get_json(&self, url: &str, user_agent: &str) -> Result<JsonValue, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), user_agent.to_string()));
            self.responses.get(url).cloned().unwrap_or_else(|| {
                Err(FetchError::Status { status: 404, url: url.to_string() })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_and_transport_failures_retry() {
        assert!(FetchError::Status { status: 502, url: "u".into() }.is_retryable());
        assert!(!FetchError::Status { status: 404, url: "u".into() }.is_retryable());
        assert!(FetchError::Transport { url: "u".into(), reason: "reset".into() }.is_retryable());
        assert!(!FetchError::Decode { url: "u".into(), reason: "eof".into() }.is_retryable());
    }
}

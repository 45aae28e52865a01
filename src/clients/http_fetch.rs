use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;

use crate::core::fetch::{FetchError, JsonFetch};
use crate::infra::config::HttpConfig;
use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::runtime::limits::{make_http_client, make_http_client_with, retry_async_if};

/// reqwest-backed [`JsonFetch`] with bounded latency and retries on
/// transport errors and 5xx responses.
#[derive(Clone)]
pub struct ReqwestFetch {
    http: Client,
    retries: u32,
}

impl ReqwestFetch {
    pub fn new() -> Self {
        Self { http: make_http_client(), retries: 2 }
    }

    pub fn from_config(cfg: &HttpConfig) -> Self {
        Self { http: make_http_client_with(cfg), retries: cfg.retries }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JsonFetch for ReqwestFetch {
    async fn get_json(&self, url: &str, user_agent: &str) -> Result<JsonValue, FetchError> {
        let req_id = generate_request_id();
        tracing::debug!(endpoint = %url, request_id = %req_id, "upstream GET");
        let start = Instant::now();
        let res = retry_async_if(self.retries, FetchError::is_retryable, |attempt| {
            let http = self.http.clone();
            let req_id = req_id.clone();
            async move {
                if attempt > 0 {
                    tracing::debug!(endpoint = %url, attempt, "retrying upstream GET");
                }
                let (builder, _rid) = add_standard_headers(http.get(url), user_agent, Some(req_id));
                let resp = builder.send().await.map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
                }
                resp.json::<JsonValue>().await.map_err(|e| FetchError::Decode {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        })
        .await;
        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric("upstream", "remote_latency_ms", elapsed_ms);
            }
            Err(e) => {
                tracing::warn!(endpoint = %url, error = %e, "upstream GET failed");
                crate::infra::logging::log_metric("upstream", "remote_error_total", 1.0);
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const UA: &str = "(test-app, test@example.com)";

    #[tokio::test]
    async fn it_sends_identification_and_request_id_headers() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/points/1,2")
                .header("user-agent", UA)
                .header_exists("x-request-id")
                .header_exists("accept");
            then.status(200).json_body(json!({"ok": true}));
        });
        let out = ReqwestFetch::new().get_json(&server.url("/points/1,2"), UA).await.unwrap();
        m.assert();
        assert_eq!(out["ok"], true);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("nope");
        });
        let err = ReqwestFetch::new()
            .with_retries(3)
            .get_json(&server.url("/missing"), UA)
            .await
            .unwrap_err();
        assert_eq!(m.hits(), 1);
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_reported() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503).body("busy");
        });
        let err = ReqwestFetch::new()
            .with_retries(2)
            .get_json(&server.url("/flaky"), UA)
            .await
            .unwrap_err();
        assert_eq!(m.hits(), 3);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn non_json_bodies_are_decode_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html");
            then.status(200).body("<html></html>");
        });
        let err = ReqwestFetch::new().get_json(&server.url("/html"), UA).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}

use std::sync::Arc;

use crate::clients::http_fetch::ReqwestFetch;
use crate::clients::nws::NwsClient;
use crate::clients::zippopotam::ZippopotamClient;
use crate::core::error::ConfigError;
use crate::core::fetch::JsonFetch;
use crate::infra::config::{Config, DEFAULT_NWS_BASE_URL, DEFAULT_ZIP_BASE_URL};
use crate::infra::http::headers::AppIdentity;

/// Shared dependencies handed to every tool factory.
#[derive(Clone)]
pub struct ToolContext {
    fetch: Arc<dyn JsonFetch>,
    identity: AppIdentity,
    nws_base_url: String,
    zip_base_url: String,
}

impl ToolContext {
    pub fn new(fetch: Arc<dyn JsonFetch>, identity: AppIdentity) -> Self {
        Self {
            fetch,
            identity,
            nws_base_url: DEFAULT_NWS_BASE_URL.into(),
            zip_base_url: DEFAULT_ZIP_BASE_URL.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let fetch = Arc::new(ReqwestFetch::from_config(&cfg.http)) as Arc<dyn JsonFetch>;
        Self::new(fetch, cfg.weather.identity.clone())
            .with_nws_base_url(cfg.weather.nws_base_url.clone())
            .with_zip_base_url(cfg.weather.zip_base_url.clone())
    }

    pub fn with_nws_base_url(mut self, url: impl Into<String>) -> Self {
        self.nws_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_zip_base_url(mut self, url: impl Into<String>) -> Self {
        self.zip_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn nws_base_url(&self) -> &str {
        &self.nws_base_url
    }

    /// Must be called before any outbound request.
    pub fn user_agent_header_text(&self) -> Result<String, ConfigError> {
        self.identity.user_agent_header_text()
    }

    pub fn nws(&self) -> NwsClient {
        NwsClient::new(self.nws_base_url.clone(), self.fetch.clone())
    }

    pub fn zippopotam(&self) -> ZippopotamClient {
        ZippopotamClient::new(self.zip_base_url.clone(), self.fetch.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::fetch::stub::StubFetch;

    pub fn identity() -> AppIdentity {
        AppIdentity::new("test-app", "test@example.com")
    }

    pub const USER_AGENT: &str = "(test-app, test@example.com)";

    /// Context talking to a real HTTP server (httpmock) for both upstreams.
    pub fn http_context(base_url: &str) -> ToolContext {
        let fetch = Arc::new(ReqwestFetch::new().with_retries(0)) as Arc<dyn JsonFetch>;
        ToolContext::new(fetch, identity())
            .with_nws_base_url(base_url)
            .with_zip_base_url(base_url)
    }

    pub fn stub_context(stub: Arc<StubFetch>, identity: AppIdentity) -> ToolContext {
        ToolContext::new(stub, identity).with_nws_base_url("https://nws.test")
    }
}

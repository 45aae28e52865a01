use reqwest::RequestBuilder;

use crate::core::error::ConfigError;

/// Application name and contact the weather API asks every client to send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_name: Option<String>,
    pub app_contact: Option<String>,
}

impl AppIdentity {
    pub fn new(app_name: impl Into<String>, app_contact: impl Into<String>) -> Self {
        Self { app_name: Some(app_name.into()), app_contact: Some(app_contact.into()) }
    }

    /// `(name, contact)`. Fails before any request is built if either part is
    /// absent or blank.
    pub fn user_agent_header_text(&self) -> Result<String, ConfigError> {
        let name = present(&self.app_name).ok_or(ConfigError::Missing("WEATHER_APP_NAME"))?;
        let contact =
            present(&self.app_contact).ok_or(ConfigError::Missing("WEATHER_APP_CONTACT"))?;
        Ok(format!("({name}, {contact})"))
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("wx-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Add standard headers to an outgoing request. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    user_agent: &str,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder
        .header("x-request-id", rid.as_str())
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, "application/geo+json, application/json");
    (b, rid)
}

//! Process configuration: defaults, then an optional TOML file named by
//! `WEATHER_CONFIG`, then environment overrides.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::infra::http::headers::AppIdentity;

pub const DEFAULT_NWS_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_ZIP_BASE_URL: &str = "https://api.zippopotam.us";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub port: u16,
    pub deprecate_rest: bool,
    pub weather: WeatherConfig,
    pub http: HttpConfig,
    /// Tools whose names are reserved but left uninstantiated.
    pub disabled_tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub identity: AppIdentity,
    pub nws_base_url: String,
    pub zip_base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "server".into(),
            port: 8080,
            deprecate_rest: false,
            weather: WeatherConfig {
                identity: AppIdentity::default(),
                nws_base_url: DEFAULT_NWS_BASE_URL.into(),
                zip_base_url: DEFAULT_ZIP_BASE_URL.into(),
            },
            http: HttpConfig { connect_timeout_ms: 2_000, timeout_ms: 10_000, retries: 2 },
            disabled_tools: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<String>,
    pub port: Option<u16>,
    pub deprecate_rest: Option<bool>,
    pub disabled_tools: Option<Vec<String>>,
    #[serde(default)]
    pub weather: FileWeatherConfig,
    #[serde(default)]
    pub http: FileHttpConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileWeatherConfig {
    pub app_name: Option<String>,
    pub app_contact: Option<String>,
    pub nws_base_url: Option<String>,
    pub zip_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileHttpConfig {
    pub connect_timeout_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

impl Config {
    /// Like [`Config::load`], but an unreadable file only logs a warning.
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring config file");
                let mut cfg = Self::default();
                cfg.apply_env();
                cfg
            }
        }
    }

    pub fn load() -> Result<Self, ConfigFileError> {
        let mut cfg = Self::default();
        if let Some(path) = env_string("WEATHER_CONFIG") {
            let path = PathBuf::from(path);
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| ConfigFileError::Read { path: path.clone(), source })?;
            let file: FileConfig =
                toml::from_str(&raw).map_err(|source| ConfigFileError::Parse { path, source })?;
            cfg.apply_file(file);
        }
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let mut cfg = Self::default();
        cfg.apply_file(toml::from_str(raw)?);
        Ok(cfg)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(mode) = file.mode {
            self.mode = mode;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(deprecate) = file.deprecate_rest {
            self.deprecate_rest = deprecate;
        }
        if let Some(disabled) = file.disabled_tools {
            self.disabled_tools = disabled;
        }
        let w = file.weather;
        if w.app_name.is_some() {
            self.weather.identity.app_name = w.app_name;
        }
        if w.app_contact.is_some() {
            self.weather.identity.app_contact = w.app_contact;
        }
        if let Some(url) = w.nws_base_url {
            self.weather.nws_base_url = url;
        }
        if let Some(url) = w.zip_base_url {
            self.weather.zip_base_url = url;
        }
        let h = file.http;
        if let Some(ms) = h.connect_timeout_ms {
            self.http.connect_timeout_ms = ms;
        }
        if let Some(ms) = h.timeout_ms {
            self.http.timeout_ms = ms;
        }
        if let Some(n) = h.retries {
            self.http.retries = n;
        }
    }

    fn apply_env(&mut self) {
        if let Some(mode) = env_string("MODE") {
            self.mode = mode;
        }
        if let Some(port) = env_parse::<u16>("PORT") {
            self.port = port;
        }
        if let Ok(v) = std::env::var("DEPRECATE_REST") {
            self.deprecate_rest = !v.is_empty();
        }
        if let Some(name) = env_string("WEATHER_APP_NAME") {
            self.weather.identity.app_name = Some(name);
        }
        if let Some(contact) = env_string("WEATHER_APP_CONTACT") {
            self.weather.identity.app_contact = Some(contact);
        }
        if let Some(url) = env_string("NWS_BASE_URL") {
            self.weather.nws_base_url = url;
        }
        if let Some(url) = env_string("ZIP_BASE_URL") {
            self.weather.zip_base_url = url;
        }
        if let Some(ms) = env_parse("HTTP_CONNECT_TIMEOUT_MS") {
            self.http.connect_timeout_ms = ms;
        }
        if let Some(ms) = env_parse("HTTP_TIMEOUT_MS") {
            self.http.timeout_ms = ms;
        }
        if let Some(n) = env_parse("HTTP_RETRIES") {
            self.http.retries = n;
        }
        if let Some(list) = env_string("DISABLED_TOOLS") {
            self.disabled_tools = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Checks run by `config --validate` and at boot.
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", self.mode));
        }
        if self.mode == "server" && self.port == 0 {
            return Err("PORT cannot be 0".into());
        }
        for url in [&self.weather.nws_base_url, &self.weather.zip_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("Invalid base URL: {url}"));
            }
        }
        if self.http.timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS cannot be 0".into());
        }
        self.weather
            .identity
            .user_agent_header_text()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|s| s.parse::<T>().ok())
}

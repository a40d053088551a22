use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::{ClientConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

const ENV_PREFIX: &str = "TWITCH_";

/// Client settings as stored in a JSON file or the environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    pub id: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default, alias = "uri")]
    pub redirect_uri: Option<String>,
    #[serde(default = "default_timeout_ms", alias = "timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,
    #[serde(default = "default_api_version", alias = "version")]
    pub api_version: String,
    /// Default OAuth token
    #[serde(default)]
    pub token: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl ClientSettings {
    /// Creates settings with defaults for everything but the client ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: None,
            redirect_uri: None,
            timeout_ms: default_timeout_ms(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            token: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse client settings")
    }

    /// Reads settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&data)
    }

    /// Reads settings from `TWITCH_*` environment variables
    ///
    /// `TWITCH_CLIENT_ID` is required; the others are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty())
        };

        let id = var("CLIENT_ID").context("TWITCH_CLIENT_ID is not set")?;
        let mut settings = Self::new(id);
        settings.secret = var("CLIENT_SECRET");
        settings.redirect_uri = var("REDIRECT_URI");
        settings.token = var("TOKEN");
        if let Some(timeout) = var("TIMEOUT_MS") {
            settings.timeout_ms = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid TWITCH_TIMEOUT_MS: {timeout}"))?;
        }
        if let Some(base_url) = var("BASE_URL") {
            settings.base_url = base_url;
        }
        if let Some(api_version) = var("API_VERSION") {
            settings.api_version = api_version;
        }
        Ok(settings)
    }

    /// Converts into a client configuration
    pub fn into_config(self) -> ClientConfig {
        ClientConfig {
            id: self.id,
            secret: self.secret,
            redirect_uri: self.redirect_uri,
            timeout: Duration::from_millis(self.timeout_ms),
            base_url: self.base_url,
            api_version: self.api_version,
            token: self.token,
            log: None,
        }
    }
}

impl From<ClientSettings> for ClientConfig {
    fn from(settings: ClientSettings) -> Self {
        settings.into_config()
    }
}

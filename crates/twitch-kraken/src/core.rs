//! Request builder and dispatcher shared by every Kraken endpoint.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE,
};
use reqwest::Method;
use serde_json::Value;

use crate::error::{ConfigError, Error, Result};
use crate::http::{HttpClient, HttpRequest, ReqwestClient};
use crate::log::RequestLog;
use crate::normalize::normalize;
use crate::util::{append_query, is_absolute_url, join_path, Params};

pub const DEFAULT_BASE_URL: &str = "https://api.twitch.tv/kraken";
pub const DEFAULT_API_VERSION: &str = "v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

const LOG_TAG: &str = "[Twitch]";

/// Client identity and defaults, fixed at construction
#[derive(Clone)]
pub struct ClientConfig {
    pub id: String,
    pub secret: Option<String>,
    /// Required only for the authorization-code flow
    pub redirect_uri: Option<String>,
    pub timeout: Duration,
    pub base_url: String,
    pub api_version: String,
    /// Default OAuth token sent when a call does not bring its own
    pub token: Option<String>,
    pub log: Option<Arc<dyn RequestLog>>,
}

impl ClientConfig {
    /// Creates a configuration with default timeout, base URL and version
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: None,
            redirect_uri: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            log: None,
        }
    }

    #[must_use]
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn log(mut self, log: impl RequestLog + 'static) -> Self {
        self.log = Some(Arc::new(log));
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("id", &self.id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("log", &self.log.is_some())
            .finish()
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent verbatim
    Text(String),
    /// Serialized to JSON; implies `Content-Type: application/json`
    Json(Value),
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Which token a single call authenticates with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenOverride {
    /// Use the client's default token, if any
    #[default]
    Inherit,
    Token(String),
    /// Send no Authorization header even if a default token is set
    Anonymous,
}

/// Per-call options; every unset field falls back to the client default
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub params: Params,
    pub payload: Option<Payload>,
    /// Wins over both a `Content-Type` entry in `headers` and the JSON default
    pub content_type: Option<String>,
    /// Extra headers, applied after the computed ones
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub token: TokenOverride,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params.merge_from(&params);
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = TokenOverride::Token(token.into());
        self
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.token = TokenOverride::Anonymous;
        self
    }
}

/// Kraken API request core
///
/// Builds requests from a [`ClientConfig`] plus per-call [`CallOptions`],
/// sends them through an [`HttpClient`] and normalizes the response. Generic
/// over the HTTP client implementation for testability.
pub struct ClientCore<H: HttpClient = ReqwestClient> {
    pub(crate) http: H,
    pub(crate) id: String,
    pub(crate) secret: Option<String>,
    pub(crate) redirect_uri: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) base_url: String,
    pub(crate) api_version: String,
    token: Arc<RwLock<Option<String>>>,
    log: Option<Arc<dyn RequestLog>>,
}

impl ClientCore<ReqwestClient> {
    /// Creates a client core with the default HTTP implementation
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_http_client(config, ReqwestClient::new())
    }
}

impl<H: HttpClient> ClientCore<H> {
    /// Creates a client core with a custom HTTP implementation
    pub fn with_http_client(config: ClientConfig, http: H) -> Result<Self, ConfigError> {
        if config.id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }

        Ok(Self {
            http,
            id: config.id,
            secret: config.secret.filter(|s| !s.is_empty()),
            redirect_uri: config.redirect_uri.filter(|u| !u.is_empty()),
            timeout: config.timeout,
            base_url: config.base_url,
            api_version: config.api_version,
            token: Arc::new(RwLock::new(config.token.filter(|t| !t.is_empty()))),
            log: config.log,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Gets the current default token
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the default token, e.g. after a refresh
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(token).filter(|t| !t.is_empty());
    }

    /// Removes the default token
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Builds the outbound request without sending it
    ///
    /// All argument validation happens here, so configuration errors are
    /// reported before any network access.
    pub fn prepare(
        &self,
        method: &str,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<HttpRequest, ConfigError> {
        if method.is_empty() {
            return Err(ConfigError::MissingMethod);
        }
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(method.to_string()))?;

        let base_url = options.base_url.as_deref().unwrap_or(&self.base_url);
        let api_version = options.api_version.as_deref().unwrap_or(&self.api_version);
        let token = match options.token {
            TokenOverride::Inherit => self.token(),
            TokenOverride::Token(t) => Some(t),
            TokenOverride::Anonymous => None,
        }
        .filter(|t| !t.is_empty());

        let target = if is_absolute_url(endpoint) {
            endpoint.to_string()
        } else {
            join_path(base_url, &[endpoint])
        };
        let url = append_query(&target, &options.params)
            .map_err(|source| ConfigError::InvalidUrl { url: target.clone(), source })?;

        let (body, implied_type): (Option<String>, Option<&'static str>) = match options.payload {
            None => (None, None),
            Some(Payload::Text(text)) => (Some(text), None),
            Some(Payload::Json(value)) => (
                Some(serde_json::to_string(&value).map_err(ConfigError::Payload)?),
                Some("application/json"),
            ),
        };
        let body = body.filter(|b| !b.is_empty());

        let extra = options
            .headers
            .iter()
            .map(|(name, value)| -> Result<_, ConfigError> {
                Ok((header_name(name)?, header_value(name, value)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let content_type = match &options.content_type {
            Some(content_type) => Some(header_value("Content-Type", content_type)?),
            None => extra
                .iter()
                .find(|(name, _)| *name == CONTENT_TYPE)
                .map(|(_, value)| value.clone())
                .or_else(|| implied_type.map(HeaderValue::from_static)),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            header_value("Accept", &format!("application/vnd.twitchtv.{api_version}+json"))?,
        );
        headers.insert(
            HeaderName::from_static("client-id"),
            header_value("Client-ID", &self.id)?,
        );
        if let Some(token) = &token {
            headers.insert(AUTHORIZATION, header_value("Authorization", &format!("OAuth {token}"))?);
        }
        if let Some(body) = &body {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        for (name, value) in extra {
            headers.insert(name, value);
        }
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, content_type);
        }

        tracing::debug!(
            method = %method,
            url = %url,
            authorized = token.is_some(),
            "Prepared Kraken request"
        );

        Ok(HttpRequest {
            method,
            url,
            headers,
            timeout: options.timeout.unwrap_or(self.timeout),
            body,
        })
    }

    /// Sends a request to the API and returns the decoded JSON
    pub async fn call(&self, method: &str, endpoint: &str, options: CallOptions) -> Result<Value> {
        let request = self.prepare(method, endpoint, options)?;
        self.dispatch(request).await
    }

    /// `call` with method GET
    pub async fn get(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.call("GET", endpoint, options).await
    }

    /// `call` with method PUT
    pub async fn put(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.call("PUT", endpoint, options).await
    }

    /// `call` with method DELETE
    pub async fn delete(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.call("DELETE", endpoint, options).await
    }

    /// `call` with method POST
    pub async fn post(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.call("POST", endpoint, options).await
    }

    /// Sends an already prepared request and normalizes the response
    pub async fn dispatch(&self, request: HttpRequest) -> Result<Value> {
        if let Some(log) = &self.log {
            log.info(LOG_TAG, &format!("{} {}", request.method, request.url));
        }

        let response = self.http.send(request).await.map_err(Error::Transport)?;
        Ok(normalize(&response)?)
    }
}

impl<H: HttpClient + Clone> Clone for ClientCore<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            id: self.id.clone(),
            secret: self.secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            timeout: self.timeout,
            base_url: self.base_url.clone(),
            api_version: self.api_version.clone(),
            token: self.token.clone(),
            log: self.log.clone(),
        }
    }
}

fn header_name(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

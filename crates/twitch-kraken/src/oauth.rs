//! OAuth2 authorization-code and refresh-token flows.
//!
//! The authorization URL is where users are redirected to grant access; the
//! token exchange turns the returned code (or a refresh token) into an access
//! token through the same request core as every other call.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::{CallOptions, ClientCore};
use crate::error::{ConfigError, Error, Result};
use crate::http::{HttpClient, HttpRequest};
use crate::util::{append_query, join_path, Params};

const AUTHORIZE_PATH: &str = "/oauth2/authorize";
const TOKEN_PATH: &str = "/oauth2/token";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Options for [`ClientCore::auth_url`]
#[derive(Debug, Clone, Default)]
pub struct AuthUrlOptions {
    pub scope: Vec<String>,
    /// Opaque value echoed back to the redirect URI
    pub state: Option<String>,
    /// Ask Twitch to re-prompt even if the user already authorized the app
    pub force_verify: bool,
}

impl AuthUrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn force_verify(mut self, force_verify: bool) -> Self {
        self.force_verify = force_verify;
        self
    }
}

/// Input of the token exchange
///
/// One of `code` or `refresh_token` is required; `code` is used if both are
/// set.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub state: Option<String>,
}

impl TokenRequest {
    /// Exchange an authorization code
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Exchange a refresh token
    pub fn refresh(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: Some(refresh_token.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// Response from the token endpoint
///
/// Only lightly typed: fields Twitch adds beyond these land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scope: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl<H: HttpClient> ClientCore<H> {
    /// Builds the URL to redirect users to for authorization
    ///
    /// Requires a redirect URI in the client configuration.
    pub fn auth_url(&self, options: &AuthUrlOptions) -> Result<String, ConfigError> {
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or(ConfigError::MissingRedirectUri)?;

        let mut query = Params::new()
            .with("response_type", "code")
            .with("client_id", self.id.as_str())
            .with("redirect_uri", redirect_uri)
            .with("scope", options.scope.join(" "));
        if let Some(state) = non_empty(options.state.as_ref()) {
            query.set("state", state);
        }
        if options.force_verify {
            query.set("force_verify", "true");
        }

        let target = join_path(&self.base_url, &[AUTHORIZE_PATH]);
        append_query(&target, &query)
            .map_err(|source| ConfigError::InvalidUrl { url: target, source })
    }

    /// Builds the token exchange request without sending it
    ///
    /// Needs the client secret, and the redirect URI when exchanging a code.
    pub fn token_request(&self, request: &TokenRequest) -> Result<HttpRequest, ConfigError> {
        let code = non_empty(request.code.as_ref());
        let refresh_token = non_empty(request.refresh_token.as_ref());
        if code.is_none() && refresh_token.is_none() {
            return Err(ConfigError::MissingGrant);
        }
        let secret = self.secret.as_deref().ok_or(ConfigError::MissingSecret)?;

        let mut form = Params::new()
            .with(
                "grant_type",
                if code.is_some() {
                    "authorization_code"
                } else {
                    "refresh_token"
                },
            )
            .with("client_id", self.id.as_str())
            .with("client_secret", secret);

        match (code, refresh_token) {
            (Some(code), _) => {
                let redirect_uri = self
                    .redirect_uri
                    .as_deref()
                    .ok_or(ConfigError::MissingRedirectUri)?;
                form.set("redirect_uri", redirect_uri);
                form.set("code", code);
            }
            (None, Some(refresh_token)) => form.set("refresh_token", refresh_token),
            (None, None) => return Err(ConfigError::MissingGrant),
        }
        if let Some(state) = non_empty(request.state.as_ref()) {
            form.set("state", state);
        }

        self.prepare(
            "POST",
            TOKEN_PATH,
            CallOptions::new()
                .payload(form.to_query_string())
                .content_type(FORM_CONTENT_TYPE),
        )
    }

    /// Requests an access token with an authorization code or refresh token
    pub async fn exchange_token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        let http_request = self.token_request(request)?;
        let value = self.dispatch(http_request).await?;
        let token: TokenResponse = serde_json::from_value(value).map_err(Error::Decode)?;

        tracing::info!("Token received successfully (scopes: {})", token.scope.join(" "));
        Ok(token)
    }
}

//! Error types for the Kraken client.
//!
//! Configuration problems are detected while a request is being prepared and
//! never reach the network. API errors come back from Twitch (or are inferred
//! from an error status with no usable body). Transport failures are passed
//! through from the [`HttpClient`](crate::http::HttpClient) untouched.

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised before a request is sent
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Client ID not specified")]
    MissingClientId,
    #[error("Method not specified")]
    MissingMethod,
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("Endpoint not specified")]
    MissingEndpoint,
    #[error("Invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Redirect URI not specified")]
    MissingRedirectUri,
    #[error("Client secret not specified")]
    MissingSecret,
    #[error("Authorization code or refresh token required")]
    MissingGrant,
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Failed to serialize payload: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Error reported by the Twitch API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Twitch API error {status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true for 401 responses, usually an expired or revoked token
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    /// Returns true if status is 404
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }
}

/// Any failure of a client call
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Transport error: {0:#}")]
    Transport(#[source] anyhow::Error),
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Returns the API error, if the remote side rejected the call
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if the error was raised before anything was sent
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_status_and_message() {
        let err = ApiError::new(404, "test message");

        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "test message");
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "Twitch API error 404: test message");
    }

    #[test]
    fn config_errors_convert_into_error() {
        let err: Error = ConfigError::MissingSecret.into();

        assert!(err.is_config());
        assert!(err.as_api().is_none());
        assert_eq!(err.to_string(), "Client secret not specified");
    }

    #[test]
    fn api_errors_are_distinguishable_from_config_errors() {
        let err: Error = ApiError::new(401, "invalid token").into();

        assert!(!err.is_config());
        assert!(err.as_api().unwrap().is_unauthorized());
    }

    #[test]
    fn transport_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection reset").context("Failed to send request");
        let err = Error::Transport(inner);

        let text = err.to_string();
        assert!(text.contains("Failed to send request"));
        assert!(text.contains("connection reset"));
    }
}

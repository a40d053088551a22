//! Client for the Twitch Kraken REST API
//!
//! [`TwitchClient`] exposes one method per endpoint on top of [`ClientCore`],
//! which builds requests, sends them through an [`HttpClient`] and turns the
//! responses into JSON values or typed errors.

pub mod client;
pub mod core;
pub mod error;
pub mod http;
pub mod log;
pub mod normalize;
pub mod oauth;
pub mod settings;
pub mod util;

#[cfg(test)]
mod testutil;

pub use crate::client::TwitchClient;
pub use crate::core::{CallOptions, ClientConfig, ClientCore, Payload, TokenOverride};
pub use crate::error::{ApiError, ConfigError, Error, Result};
pub use crate::http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use crate::log::{RequestLog, TracingLog};
pub use crate::oauth::{AuthUrlOptions, TokenRequest, TokenResponse};
pub use crate::settings::ClientSettings;
pub use crate::util::Params;

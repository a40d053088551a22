use serde_json::{json, Value};

use crate::core::{CallOptions, ClientConfig, ClientCore, Payload};
use crate::error::{ConfigError, Result};
use crate::http::{HttpClient, ReqwestClient};
use crate::normalize::is_truthy;
use crate::oauth::{AuthUrlOptions, TokenRequest, TokenResponse};
use crate::util::{format_endpoint, Params};

/// Twitch Kraken API client
///
/// One method per endpoint, each a thin path template over [`ClientCore`].
/// Every method takes trailing [`CallOptions`] for query parameters, token
/// overrides and the like. Generic over the HTTP client implementation for
/// testability.
///
/// Path arguments (channel names, user names, IDs) are percent-encoded before
/// they are placed in the URL. Pass them raw: a value that is already encoded
/// gets encoded a second time, so `a%20b` is sent as `a%2520b`.
pub struct TwitchClient<H: HttpClient = ReqwestClient> {
    core: ClientCore<H>,
}

impl TwitchClient<ReqwestClient> {
    /// Creates a new Twitch API client with the default HTTP implementation
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            core: ClientCore::new(config)?,
        })
    }
}

impl<H: HttpClient> TwitchClient<H> {
    /// Creates a new Twitch API client with a custom HTTP implementation
    pub fn with_http_client(config: ClientConfig, http: H) -> Result<Self, ConfigError> {
        Ok(Self {
            core: ClientCore::with_http_client(config, http)?,
        })
    }

    /// The request core shared by all endpoint methods
    pub fn core(&self) -> &ClientCore<H> {
        &self.core
    }

    pub fn into_core(self) -> ClientCore<H> {
        self.core
    }

    /// Sets the default access token for API requests
    pub fn set_token(&self, token: impl Into<String>) {
        self.core.set_token(token);
    }

    /// Clears the default access token
    pub fn clear_token(&self) {
        self.core.clear_token();
    }

    pub async fn call(&self, method: &str, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.core.call(method, endpoint, options).await
    }

    pub async fn get(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.core.get(endpoint, options).await
    }

    pub async fn put(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.core.put(endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.core.delete(endpoint, options).await
    }

    pub async fn post(&self, endpoint: &str, options: CallOptions) -> Result<Value> {
        self.core.post(endpoint, options).await
    }

    /// See [`ClientCore::auth_url`]
    pub fn auth_url(&self, options: &AuthUrlOptions) -> Result<String, ConfigError> {
        self.core.auth_url(options)
    }

    /// See [`ClientCore::exchange_token`]
    pub async fn exchange_token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        self.core.exchange_token(request).await
    }
}

impl<H: HttpClient + Clone> Clone for TwitchClient<H> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

/// Puts `defaults` in front of the caller's params; caller values win
fn with_default_params(mut options: CallOptions, defaults: Params) -> CallOptions {
    let mut params = defaults;
    params.merge_from(&options.params);
    options.params = params;
    options
}

// Block-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /users/:user/blocks`
    pub async fn get_blocks(&self, user: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/users/:user/blocks", &[("user", user)]);
        self.core.get(&endpoint, options).await
    }

    /// `PUT /users/:user/blocks/:target`
    pub async fn add_block(&self, user: &str, target: &str, options: CallOptions) -> Result<Value> {
        let endpoint =
            format_endpoint("/users/:user/blocks/:target", &[("user", user), ("target", target)]);
        self.core.put(&endpoint, options).await
    }

    /// `DELETE /users/:user/blocks/:target`
    pub async fn remove_block(&self, user: &str, target: &str, options: CallOptions) -> Result<Value> {
        let endpoint =
            format_endpoint("/users/:user/blocks/:target", &[("user", user), ("target", target)]);
        self.core.delete(&endpoint, options).await
    }
}

// Channel-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /channels/:channel`
    pub async fn get_channel(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /channel`, the channel of the authenticated user
    pub async fn get_my_channel(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/channel", options).await
    }

    /// `GET /channels/:channel/editors`
    pub async fn get_channel_editors(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/editors", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `PUT /channels/:channel`
    ///
    /// `data` is wrapped as `{"channel": data}` unless it already carries a
    /// truthy `channel` field. A payload set in `options` takes precedence.
    pub async fn update_channel(
        &self,
        channel: &str,
        data: Value,
        mut options: CallOptions,
    ) -> Result<Value> {
        let has_channel = data.get("channel").is_some_and(is_truthy);
        let data = if has_channel {
            data
        } else {
            json!({ "channel": data })
        };
        if options.payload.is_none() {
            options.payload = Some(Payload::Json(data));
        }

        let endpoint = format_endpoint("/channels/:channel", &[("channel", channel)]);
        self.core.put(&endpoint, options).await
    }

    /// `DELETE /channels/:channel/stream_key`
    pub async fn reset_stream_key(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/stream_key", &[("channel", channel)]);
        self.core.delete(&endpoint, options).await
    }

    /// `POST /channels/:channel/commercial`
    ///
    /// Sends `{"length": n}` when a length is given; Twitch defaults to 30
    /// seconds otherwise.
    pub async fn run_commercial(
        &self,
        channel: &str,
        length: Option<u32>,
        mut options: CallOptions,
    ) -> Result<Value> {
        if let Some(length) = length.filter(|l| *l > 0) {
            if options.payload.is_none() {
                options.payload = Some(Payload::Json(json!({ "length": length })));
            }
        }

        let endpoint = format_endpoint("/channels/:channel/commercial", &[("channel", channel)]);
        self.core.post(&endpoint, options).await
    }

    /// `GET /channels/:channel/teams`
    pub async fn get_channel_teams(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/teams", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }
}

// Chat-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /chat/:channel/badges`
    pub async fn get_chat_badges(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/chat/:channel/badges", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /chat/emoticons`
    pub async fn get_emotes(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/chat/emoticons", options).await
    }

    /// `GET /chat/emoticon_images`
    pub async fn get_emote_images(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/chat/emoticon_images", options).await
    }
}

// Follow-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /channels/:channel/follows`
    pub async fn get_followers(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/follows", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /users/:user/follows/channels`
    pub async fn get_followed_channels(&self, user: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/users/:user/follows/channels", &[("user", user)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /users/:user/follows/channels/:target`
    ///
    /// Twitch answers 404 when the user does not follow `target`.
    pub async fn get_follow_status(&self, user: &str, target: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint(
            "/users/:user/follows/channels/:target",
            &[("user", user), ("target", target)],
        );
        self.core.get(&endpoint, options).await
    }

    /// `PUT /users/:user/follows/channels/:target`
    pub async fn follow_channel(&self, user: &str, target: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint(
            "/users/:user/follows/channels/:target",
            &[("user", user), ("target", target)],
        );
        self.core.put(&endpoint, options).await
    }

    /// `DELETE /users/:user/follows/channels/:target`
    pub async fn unfollow_channel(&self, user: &str, target: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint(
            "/users/:user/follows/channels/:target",
            &[("user", user), ("target", target)],
        );
        self.core.delete(&endpoint, options).await
    }
}

// Game, ingest and root methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /games/top`
    pub async fn get_top_games(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/games/top", options).await
    }

    /// `GET /ingests`
    pub async fn get_ingests(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/ingests", options).await
    }

    /// `GET /`, token status and links
    pub async fn get_root(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/", options).await
    }
}

// Search methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /search/channels?query=...`
    pub async fn search_channels(&self, query: &str, options: CallOptions) -> Result<Value> {
        let options = with_default_params(options, Params::new().with("query", query));
        self.core.get("/search/channels", options).await
    }

    /// `GET /search/streams?query=...`
    pub async fn search_streams(&self, query: &str, options: CallOptions) -> Result<Value> {
        let options = with_default_params(options, Params::new().with("query", query));
        self.core.get("/search/streams", options).await
    }

    /// `GET /search/games?query=...&type=suggest`
    pub async fn search_games(&self, query: &str, options: CallOptions) -> Result<Value> {
        let defaults = Params::new().with("query", query).with("type", "suggest");
        let options = with_default_params(options, defaults);
        self.core.get("/search/games", options).await
    }
}

// Stream-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /streams/:channel`
    pub async fn get_stream(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/streams/:channel", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /streams`
    pub async fn get_streams(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/streams", options).await
    }

    /// `GET /streams/featured`
    pub async fn get_featured_streams(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/streams/featured", options).await
    }

    /// `GET /streams/summary`
    pub async fn get_stream_summary(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/streams/summary", options).await
    }
}

// Subscription-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /channels/:channel/subscriptions`
    pub async fn get_subscribers(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/subscriptions", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /channels/:channel/subscriptions/:user`, checked from the channel side
    pub async fn get_subscriber_status(
        &self,
        channel: &str,
        user: &str,
        options: CallOptions,
    ) -> Result<Value> {
        let endpoint = format_endpoint(
            "/channels/:channel/subscriptions/:user",
            &[("channel", channel), ("user", user)],
        );
        self.core.get(&endpoint, options).await
    }

    /// `GET /users/:user/subscriptions/:channel`, checked from the user side
    ///
    /// Needs a token with the `user_subscriptions` scope rather than
    /// `channel_check_subscription`.
    pub async fn get_subscriber_status2(
        &self,
        user: &str,
        channel: &str,
        options: CallOptions,
    ) -> Result<Value> {
        let endpoint = format_endpoint(
            "/users/:user/subscriptions/:channel",
            &[("user", user), ("channel", channel)],
        );
        self.core.get(&endpoint, options).await
    }
}

// Team-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /teams`
    pub async fn get_teams(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/teams", options).await
    }

    /// `GET /teams/:team`
    pub async fn get_team(&self, team: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/teams/:team", &[("team", team)]);
        self.core.get(&endpoint, options).await
    }
}

// User-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /users/:user`
    pub async fn get_user(&self, user: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/users/:user", &[("user", user)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /user`, the authenticated user
    pub async fn get_my_user(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/user", options).await
    }

    /// `GET /streams/followed`
    pub async fn get_followed_streams(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/streams/followed", options).await
    }

    /// `GET /videos/followed`
    pub async fn get_followed_videos(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/videos/followed", options).await
    }
}

// Video-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// `GET /videos/:id`
    pub async fn get_video(&self, id: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/videos/:id", &[("id", id)]);
        self.core.get(&endpoint, options).await
    }

    /// `GET /videos/top`
    pub async fn get_top_videos(&self, options: CallOptions) -> Result<Value> {
        self.core.get("/videos/top", options).await
    }

    /// `GET /channels/:channel/videos`
    pub async fn get_channel_videos(&self, channel: &str, options: CallOptions) -> Result<Value> {
        let endpoint = format_endpoint("/channels/:channel/videos", &[("channel", channel)]);
        self.core.get(&endpoint, options).await
    }
}

//! Integration tests for the OAuth helpers

mod common;

use common::{header, make_client, RecordingTransport};
use twitch_kraken::{
    AuthUrlOptions, ClientConfig, ConfigError, Error, TokenRequest, TwitchClient,
};

fn config() -> ClientConfig {
    ClientConfig::new("client_id")
        .secret("client_secret")
        .redirect_uri("https://example.com/auth")
}

#[test]
fn auth_url_lists_requested_scopes() {
    let (client, _) = make_client(config());

    let url = client
        .auth_url(&AuthUrlOptions::new().scope([
            "user_read",
            "user_blocks_edit",
            "channel_read",
            "chat_login",
        ]))
        .unwrap();

    assert!(url.starts_with("https://api.twitch.tv/kraken/oauth2/authorize?response_type=code"));
    assert!(url.contains("client_id=client_id"));
    assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fauth"));
    assert!(url.contains("scope=user_read+user_blocks_edit+channel_read+chat_login"));
}

#[test]
fn auth_url_follows_base_url() {
    let (client, _) = make_client(config().base_url("http://localhost:9000/kraken/"));

    let url = client.auth_url(&AuthUrlOptions::default()).unwrap();

    assert!(url.starts_with("http://localhost:9000/kraken/oauth2/authorize?"));
}

#[test]
fn auth_url_without_redirect_uri_fails() {
    let (client, transport) = make_client(ClientConfig::new("client_id"));

    let err = client.auth_url(&AuthUrlOptions::default()).unwrap_err();

    assert!(matches!(err, ConfigError::MissingRedirectUri));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn code_exchange_posts_form() {
    let transport = RecordingTransport::new(
        200,
        r#"{"access_token":"at","refresh_token":"rt","scope":["user_read","channel_read"]}"#,
    );
    let client = TwitchClient::with_http_client(config(), transport.clone()).unwrap();

    let token = client
        .exchange_token(&TokenRequest::code("the_code").state("st"))
        .await
        .unwrap();

    assert_eq!(token.access_token, "at");
    assert_eq!(token.refresh_token.as_deref(), Some("rt"));
    assert_eq!(token.scope, vec!["user_read", "channel_read"]);

    let request = transport.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "https://api.twitch.tv/kraken/oauth2/token");
    assert_eq!(
        header(&request, "Content-Type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    let body = request.body.clone().unwrap();
    assert_eq!(
        header(&request, "Content-Length"),
        Some(body.len().to_string())
    );
    assert!(body.contains("grant_type=authorization_code"));
    assert!(body.contains("client_secret=client_secret"));
    assert!(body.contains("code=the_code"));
    assert!(body.ends_with("state=st"));
}

#[tokio::test]
async fn refresh_exchange_then_use_new_token() {
    let transport = RecordingTransport::new(
        200,
        r#"{"access_token":"fresh","refresh_token":"rt2","scope":[]}"#,
    );
    let client = TwitchClient::with_http_client(config(), transport.clone()).unwrap();

    let token = client
        .exchange_token(&TokenRequest::refresh("rt1"))
        .await
        .unwrap();
    client.set_token(token.access_token);
    client
        .get_my_user(twitch_kraken::CallOptions::default())
        .await
        .unwrap();

    let requests = transport.requests();
    assert!(requests[0]
        .body
        .as_deref()
        .unwrap()
        .contains("grant_type=refresh_token"));
    assert_eq!(header(&requests[1], "Authorization").as_deref(), Some("OAuth fresh"));
}

#[tokio::test]
async fn exchange_validation_happens_before_sending() {
    let (no_secret, transport) = make_client(
        ClientConfig::new("client_id").redirect_uri("https://example.com/auth"),
    );
    let (no_uri, _) = make_client(ClientConfig::new("client_id").secret("s"));

    let missing_grant = no_secret.exchange_token(&TokenRequest::default()).await;
    let missing_secret = no_secret.exchange_token(&TokenRequest::code("c")).await;
    let missing_uri = no_uri.exchange_token(&TokenRequest::code("c")).await;

    assert!(matches!(missing_grant, Err(Error::Config(ConfigError::MissingGrant))));
    assert!(matches!(missing_secret, Err(Error::Config(ConfigError::MissingSecret))));
    assert!(matches!(missing_uri, Err(Error::Config(ConfigError::MissingRedirectUri))));
    assert!(transport.requests().is_empty());
}

//! Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use twitch_kraken::{ClientConfig, HttpClient, HttpRequest, HttpResponse, TwitchClient};

/// Transport that answers every request with the same canned response and
/// remembers what was sent
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    status: u16,
    body: String,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl RecordingTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok() -> Self {
        Self::new(200, "{}")
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpClient for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse::new(self.status, self.body.clone()))
    }
}

/// Transport that fails every request, like a refused connection
#[derive(Debug, Clone, Default)]
pub struct FailingTransport;

#[async_trait]
impl HttpClient for FailingTransport {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
        anyhow::bail!("connection refused: {}", request.url)
    }
}

/// Creates a client with a recording transport
pub fn make_client(config: ClientConfig) -> (TwitchClient<RecordingTransport>, RecordingTransport) {
    let transport = RecordingTransport::ok();
    let client = TwitchClient::with_http_client(config, transport.clone()).unwrap();
    (client, transport)
}

/// Returns a header value as a string, if present
pub fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

//! Test fixtures
//!
//! Response bodies shaped like the ones Kraken v3 returns.

use serde_json::{json, Value};

/// A `GET /channels/:channel` body
pub fn channel_json(name: &str) -> Value {
    json!({
        "_id": 12345,
        "name": name,
        "display_name": name.to_uppercase(),
        "status": "Test Stream",
        "game": "Test Game",
        "followers": 1000,
        "views": 50000,
        "_links": {
            "self": format!("https://api.twitch.tv/kraken/channels/{name}"),
        },
    })
}

/// A `GET /streams/:channel` body for a live channel
pub fn live_stream_json(name: &str) -> Value {
    json!({
        "stream": {
            "_id": 987,
            "game": "Test Game",
            "viewers": 1000,
            "channel": channel_json(name),
        },
    })
}

/// A `GET /streams/:channel` body for an offline channel
pub fn offline_stream_json() -> Value {
    json!({ "stream": null })
}

/// The error payload Kraken sends with 4xx/5xx responses
pub fn error_body(status: u16, error: &str, message: &str) -> String {
    json!({ "error": error, "status": status, "message": message }).to_string()
}

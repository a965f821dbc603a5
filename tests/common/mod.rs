#![allow(dead_code)]

use cordial::types::Interaction;
use cordial::{ClientConfig, HttpClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const APPLICATION_ID: &str = "1185352541052792800";
pub const INTERACTION_ID: &str = "1185352541052792852";
pub const TOKEN: &str = "A_UNIQUE_TOKEN";

/// Client pointed at the mock server, with sleeps short enough for tests.
pub fn http(server: &MockServer) -> HttpClient {
    http_with(server, |config| config)
}

pub fn http_with(server: &MockServer, tweak: impl FnOnce(ClientConfig) -> ClientConfig) -> HttpClient {
    let config = ClientConfig::new("test-token")
        .with_api_base(server.uri())
        .with_max_rate_limit_sleep(Duration::from_millis(20));
    HttpClient::new(tweak(config)).unwrap()
}

pub fn user(id: &str) -> Value {
    json!({"id": id, "username": "tester", "discriminator": "0", "avatar": null})
}

pub fn message(id: &str) -> Value {
    json!({
        "id": id,
        "channel_id": "645027906669510667",
        "author": user(APPLICATION_ID),
        "content": "hello",
        "timestamp": "2024-01-01T00:00:00+00:00",
        "embeds": [],
        "attachments": [],
        "components": []
    })
}

pub fn entitlement(id: u64) -> Value {
    json!({
        "id": id.to_string(),
        "sku_id": "1019475255913222144",
        "application_id": APPLICATION_ID,
        "user_id": "771129655544643584",
        "type": 8,
        "deleted": false,
        "consumed": false,
        "starts_at": null,
        "ends_at": null
    })
}

pub fn interaction(kind: u8, data: Value) -> Interaction {
    serde_json::from_value(json!({
        "id": INTERACTION_ID,
        "application_id": APPLICATION_ID,
        "type": kind,
        "data": data,
        "guild_id": "290926798626357999",
        "channel_id": "645027906669510667",
        "member": {
            "user": user("53908232506183680"),
            "roles": [],
            "joined_at": "2017-03-13T19:19:14.040000+00:00",
            "permissions": "2147483647",
            "deaf": false,
            "mute": false
        },
        "token": TOKEN,
        "version": 1,
        "app_permissions": "442368",
        "locale": "en-US",
        "entitlements": [],
        "context": 0
    }))
    .unwrap()
}

pub fn slash(name: &str) -> Interaction {
    interaction(2, json!({"id": "1", "name": name, "type": 1}))
}

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Body, HttpClient, Route};
use crate::error::HttpError;

/// Response of `GET /gateway/bot`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GatewayBot {
    pub url: String,
    pub shards: u32,
    pub session_start_limit: SessionStartLimit,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionStartLimit {
    pub total: u32,
    pub remaining: u32,
    /// Milliseconds until `remaining` resets.
    pub reset_after: u64,
    pub max_concurrency: u32,
}

impl HttpClient {
    /// Gateway URL and session-start budget.
    pub async fn gateway_bot(&self) -> Result<GatewayBot, HttpError> {
        let route = Route::new(Method::GET, "/gateway/bot");
        self.request_json(&route, &Body::Empty).await
    }
}

//! Rate-limited client for the Discord REST API.
//!
//! Every call goes through [`HttpClient::request`] so auth headers,
//! rate-limit back-off, retries and error classification live in one place.
//! Endpoints are grouped by resource in the submodules, each adding methods
//! to [`HttpClient`].

mod applications;
mod billing;
mod channels;
mod commands;
mod followups;
mod gateway;
mod guilds;
mod interactions;
mod monetization;
mod ratelimit;
mod users;

pub use self::ratelimit::RateLimitInfo;
pub use self::gateway::{GatewayBot, SessionStartLimit};

use async_lock::Mutex;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use self::ratelimit::{parse_rate_limit_headers, RateLimitedBody, RateLimiter};
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::types::id::{marker::ApplicationMarker, Id};
use crate::types::message::AttachmentFile;

/// Path parameters that get their own rate-limit bucket per value.
const MAJOR_PARAMS: [&str; 4] = ["channel_id", "guild_id", "webhook_id", "webhook_token"];

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A REST endpoint plus the values for its path placeholders.
///
/// ```ignore
/// let route = Route::new(Method::GET, "/channels/{channel_id}/messages/{message_id}")
///     .param("channel_id", channel_id)
///     .param("message_id", message_id);
/// ```
#[derive(Clone, Debug)]
pub struct Route {
    method: Method,
    template: &'static str,
    params: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    auth: bool,
}

impl Route {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            params: Vec::new(),
            query: Vec::new(),
            auth: true,
        }
    }

    pub fn param(mut self, name: &'static str, value: impl Display) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn query(mut self, name: &'static str, value: impl Display) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Send without the bot token. Interaction callbacks and webhook
    /// endpoints authenticate through the token in the path.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Key used to look up the route's bucket: method, template and the
    /// values of the major parameters.
    pub fn bucket_key(&self) -> String {
        let mut key = format!("{} {}", self.method, self.template);
        for name in MAJOR_PARAMS {
            if let Some(value) = self.param_value(name) {
                key.push(' ');
                key.push_str(value);
            }
        }
        key
    }

    /// Method and template, safe to log: tokens in the path stay hidden.
    pub fn display(&self) -> String {
        format!("{} {}", self.method, self.template)
    }

    /// Full URL under `base`, with every path segment percent-encoded.
    pub(crate) fn url(&self, base: &str) -> Result<Url, HttpError> {
        let mut url = Url::parse(base)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty();
            for segment in self.template.split('/').filter(|s| !s.is_empty()) {
                let value = segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .and_then(|name| self.param_value(name))
                    .unwrap_or(segment);
                segments.push(value);
            }
        }
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) enum Body {
    Empty,
    Json(Value),
    /// `payload_json` plus `files[n]`.
    Multipart {
        payload: Value,
        files: Vec<AttachmentFile>,
    },
}

impl Body {
    pub(crate) fn json<T: serde::Serialize>(value: &T) -> Result<Self, HttpError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|source| HttpError::Decode {
                route: "request body".to_string(),
                source,
            })
    }

    /// JSON when `files` is empty, multipart otherwise.
    pub(crate) fn with_files(payload: Value, files: &[AttachmentFile]) -> Self {
        if files.is_empty() {
            Self::Json(payload)
        } else {
            Self::Multipart {
                payload,
                files: files.to_vec(),
            }
        }
    }

    fn form(&self) -> Result<Option<Form>, HttpError> {
        let Self::Multipart { payload, files } = self else {
            return Ok(None);
        };
        let mut form = Form::new().part(
            "payload_json",
            Part::text(payload.to_string()).mime_str("application/json")?,
        );
        for (index, file) in files.iter().enumerate() {
            let part = Part::bytes(file.data.clone())
                .file_name(file.filename.clone())
                .mime_str("application/octet-stream")?;
            form = form.part(format!("files[{index}]"), part);
        }
        Ok(Some(form))
    }
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

struct Inner {
    client: reqwest::Client,
    config: ClientConfig,
    limiter: Mutex<RateLimiter>,
    /// 0 while unknown.
    application_id: AtomicU64,
}

/// A rate-limit-aware client for the Discord REST API.
///
/// Cheap to clone (internals are behind `Arc`).
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        let application_id = config.application_id.map_or(0, Id::get);
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                limiter: Mutex::new(RateLimiter::new()),
                application_id: AtomicU64::new(application_id),
            }),
        })
    }

    /// Client with default settings for `token`.
    pub fn from_token(token: impl Into<String>) -> Result<Self, HttpError> {
        Self::new(ClientConfig::new(token))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Application id from the config, or as learned from READY or
    /// [`current_application`](Self::current_application).
    pub fn application_id(&self) -> Option<Id<ApplicationMarker>> {
        Id::new_checked(self.inner.application_id.load(Ordering::Acquire))
    }

    pub fn set_application_id(&self, id: Id<ApplicationMarker>) {
        self.inner.application_id.store(id.get(), Ordering::Release);
    }

    // ------------------------------------------------------------------
    // Low-level: the single request method everything funnels through
    // ------------------------------------------------------------------

    /// Send `route` and return the raw response body.
    ///
    /// Waits out known rate limits first, retries on 429 and on 5xx for
    /// GET requests, and classifies any other failure.
    pub(crate) async fn request(&self, route: &Route, body: &Body) -> Result<String, HttpError> {
        let route_key = route.bucket_key();
        let route_display = route.display();
        let max_retries = self.inner.config.max_retries;
        let max_sleep = self.inner.config.max_rate_limit_sleep;
        let url = route.url(&self.inner.config.api_base)?;

        for attempt in 0..=max_retries {
            // Pre-request: wait if the rate limiter says so.
            let delay = self.inner.limiter.lock().await.delay_for(&route_key);
            if let Some(delay) = delay {
                let delay = delay.min(max_sleep);
                debug!(
                    route = %route_display,
                    delay_ms = delay.as_millis() as u64,
                    "rate-limit pre-emptive backoff"
                );
                tokio::time::sleep(delay).await;
            }

            let mut req = self
                .inner
                .client
                .request(route.method.clone(), url.clone());
            if route.auth {
                req = req.header(AUTHORIZATION, format!("Bot {}", self.inner.config.token));
            }
            req = match body {
                Body::Empty => req,
                Body::Json(json) => req.json(json),
                Body::Multipart { .. } => match body.form()? {
                    Some(form) => req.multipart(form),
                    None => req,
                },
            };

            let resp = req.send().await?;
            let status = resp.status();
            let rl_info = parse_rate_limit_headers(resp.headers());

            // Update the limiter regardless of status.
            self.inner.limiter.lock().await.update(&route_key, &rl_info);

            if status == StatusCode::TOO_MANY_REQUESTS {
                let text = resp.text().await.unwrap_or_default();
                let limited: RateLimitedBody = serde_json::from_str(&text).unwrap_or_default();
                let retry_after = limited
                    .retry_after
                    .or_else(|| rl_info.reset_delay().map(|d| d.as_secs_f64()))
                    .unwrap_or(1.0)
                    .max(0.0);
                let global = limited.global || rl_info.is_global;
                let delay = Duration::try_from_secs_f64(retry_after)
                    .unwrap_or(max_sleep)
                    .min(max_sleep);
                warn!(
                    route = %route_display,
                    attempt,
                    retry_after_s = retry_after,
                    global,
                    scope = rl_info.scope.as_deref().unwrap_or("unknown"),
                    limit = ?rl_info.limit,
                    "rate-limited by Discord, backing off"
                );

                if global {
                    self.inner.limiter.lock().await.lock_global(delay);
                }

                if attempt < max_retries {
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(HttpError::RateLimited {
                    route: route_display,
                    retry_after,
                    global,
                });
            }

            if status.is_server_error() && route.method == Method::GET && attempt < max_retries {
                let backoff = Duration::from_secs(1 + u64::from(attempt) * 2).min(max_sleep);
                warn!(
                    route = %route_display,
                    attempt,
                    status = status.as_u16(),
                    "server error, retrying"
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            let text = resp.text().await?;
            if status.is_success() {
                debug!(route = %route_display, status = status.as_u16(), "request complete");
                return Ok(text);
            }
            return Err(HttpError::from_status(status.as_u16(), route_display, &text));
        }

        Err(HttpError::RateLimited {
            route: route_display,
            retry_after: 0.0,
            global: false,
        })
    }

    /// Like [`request`](Self::request) but deserialises the body as JSON.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        route: &Route,
        body: &Body,
    ) -> Result<T, HttpError> {
        let text = self.request(route, body).await?;
        serde_json::from_str(&text).map_err(|source| HttpError::Decode {
            route: route.display(),
            source,
        })
    }

    /// For endpoints answering `204 No Content`.
    pub(crate) async fn request_empty(&self, route: &Route, body: &Body) -> Result<(), HttpError> {
        self.request(route, body).await.map(drop)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("token", &"<redacted>")
            .field("api_base", &self.inner.config.api_base)
            .field("application_id", &self.application_id())
            .finish()
    }
}

//! Error types shared across the crate.
//!
//! REST failures are classified by HTTP status in [`HttpError`], the way the
//! API documents them. Everything else funnels into the crate-level
//! [`Error`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::commands::CommandError;
use crate::ui::UiError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A REST call failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A payload couldn't be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The interaction has already received its initial response.
    #[error("this interaction has already been responded to")]
    InteractionResponded,

    /// The requested response type isn't valid for this interaction.
    #[error("invalid response for {interaction} interaction: {reason}")]
    InvalidResponse {
        /// Interaction kind, for the message.
        interaction: &'static str,
        /// What was wrong.
        reason: &'static str,
    },

    /// An argument was outside the range the API accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Application command registration or dispatch failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// View, item or modal failure.
    #[error(transparent)]
    Ui(#[from] UiError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Gateway connection failure.
    #[cfg(feature = "gateway")]
    #[error(transparent)]
    Gateway(#[from] crate::gateway::GatewayError),

    /// Error raised by user callback code.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Wrap an arbitrary message, for use inside callbacks.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// HTTP status of the underlying REST failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Error body Discord returns alongside non-2xx statuses.
///
/// `errors` is a nested object mirroring the request body. Each leaf holds
/// an `_errors` array of `{code, message}` objects.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    /// Discord's JSON error code (e.g. `50013` for missing permissions).
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ApiErrorBody {
    /// Parse a response body, falling back to the raw text as the message.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            code: 0,
            message: body.chars().take(200).collect(),
            errors: None,
        })
    }

    /// Flatten `errors` into `"path.to.field: message"` lines.
    pub fn field_errors(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(errors) = &self.errors {
            flatten_errors(errors, "", &mut out);
        }
        out
    }

    /// Human-readable summary: the top-level message followed by every
    /// field error on its own line.
    pub fn summary(&self) -> String {
        let fields = self.field_errors();
        if fields.is_empty() {
            return self.message.clone();
        }
        let mut text = self.message.clone();
        for line in fields {
            text.push('\n');
            text.push_str(&line);
        }
        text
    }
}

fn flatten_errors(value: &Value, prefix: &str, out: &mut Vec<String>) {
    let Some(map) = value.as_object() else {
        return;
    };
    for (key, child) in map {
        if key == "_errors" {
            let messages = child
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|e| e.get("message").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            let path = if prefix.is_empty() { "body" } else { prefix };
            out.push(format!("In {path}: {messages}"));
            continue;
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        flatten_errors(child, &path, out);
    }
}

/// Failure of a single REST request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// 400: the request body or query was rejected.
    #[error("400 Bad Request on {route} (code {}): {}", .body.code, .body.summary())]
    BadRequest { route: String, body: ApiErrorBody },

    /// 401: the token is invalid.
    #[error("401 Unauthorized on {route}: {}", .body.message)]
    Unauthorized { route: String, body: ApiErrorBody },

    /// 403: the bot lacks permission.
    #[error("403 Forbidden on {route} (code {}): {}", .body.code, .body.message)]
    Forbidden { route: String, body: ApiErrorBody },

    /// 404: the resource doesn't exist.
    #[error("404 Not Found on {route} (code {}): {}", .body.code, .body.message)]
    NotFound { route: String, body: ApiErrorBody },

    /// 429 persisted through every retry.
    #[error("rate limited on {route}, retry after {retry_after:.2}s (global: {global})")]
    RateLimited {
        route: String,
        retry_after: f64,
        global: bool,
    },

    /// 5xx: Discord had an internal failure.
    #[error("{status} server error on {route}: {}", .body.message)]
    Server {
        status: u16,
        route: String,
        body: ApiErrorBody,
    },

    /// Any other non-success status.
    #[error("{status} on {route}: {}", .body.message)]
    Status {
        status: u16,
        route: String,
        body: ApiErrorBody,
    },

    /// Network or TLS failure before a status was received.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured API base or a path parameter produced a bad URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A 2xx body didn't match the expected shape.
    #[error("failed to decode response on {route}: {source}")]
    Decode {
        route: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    /// Classify a non-success status.
    pub fn from_status(status: u16, route: impl Into<String>, raw_body: &str) -> Self {
        let route = route.into();
        let body = ApiErrorBody::parse(raw_body);
        match status {
            400 => Self::BadRequest { route, body },
            401 => Self::Unauthorized { route, body },
            403 => Self::Forbidden { route, body },
            404 => Self::NotFound { route, body },
            500..=599 => Self::Server {
                status,
                route,
                body,
            },
            _ => Self::Status {
                status,
                route,
                body,
            },
        }
    }

    /// HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidUrl(_) | Self::Decode { .. } => None,
        }
    }

    /// Discord JSON error code, when the body carried one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::BadRequest { body, .. }
            | Self::Unauthorized { body, .. }
            | Self::Forbidden { body, .. }
            | Self::NotFound { body, .. }
            | Self::Server { body, .. }
            | Self::Status { body, .. } => Some(body.code).filter(|c| *c != 0),
            _ => None,
        }
    }
}

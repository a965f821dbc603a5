//! Typed bindings for the Discord REST and gateway API.
//!
//! Layers, bottom up:
//! - [`types`]: resources mapped one-to-one onto Discord's JSON.
//! - [`http`]: rate-limited REST client.
//! - [`responder`]: the one-shot initial interaction response plus
//!   followups.
//! - [`ui`]: views, items, modals and dynamic items, routed by the
//!   [`ViewStore`](ui::ViewStore).
//! - [`commands`]: the application command tree.
//! - [`gateway`], [`events`], [`Client`]: the WebSocket driver and the event
//!   loop (feature `gateway`).

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod responder;
pub mod types;
pub mod ui;

#[cfg(feature = "gateway")]
mod client;
#[cfg(feature = "gateway")]
pub mod events;
#[cfg(feature = "gateway")]
pub mod gateway;

#[cfg(feature = "gateway")]
pub use self::client::{Client, EventHook, DEFAULT_PRUNE_INTERVAL};
pub use self::config::{ClientConfig, Intents};
pub use self::error::{Error, HttpError, Result};
pub use self::http::HttpClient;
pub use self::responder::InteractionResponder;

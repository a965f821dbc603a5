//! Client configuration.
//!
//! [`ClientConfig::from_env`] mirrors how the bot binary has always been
//! configured: a `.env` file (optional) plus `DISCORD_*` environment
//! variables.

use bitflags::bitflags;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::id::{marker::ApplicationMarker, Id};

/// Default REST base, API v10.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
/// Default CDN base used for [`Asset`](crate::types::asset::Asset) URLs.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.discordapp.com";
/// User agent in the format Discord requires: `DiscordBot (url, version)`.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/cordial-rs/cordial, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

bitflags! {
    /// Gateway event groups the bot subscribes to.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Intents: u64 {
        const GUILDS = 1 << 0;
        /// Privileged.
        const GUILD_MEMBERS = 1 << 1;
        const GUILD_MODERATION = 1 << 2;
        const GUILD_EXPRESSIONS = 1 << 3;
        const GUILD_INTEGRATIONS = 1 << 4;
        const GUILD_WEBHOOKS = 1 << 5;
        const GUILD_INVITES = 1 << 6;
        const GUILD_VOICE_STATES = 1 << 7;
        /// Privileged.
        const GUILD_PRESENCES = 1 << 8;
        const GUILD_MESSAGES = 1 << 9;
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        const GUILD_MESSAGE_TYPING = 1 << 11;
        const DIRECT_MESSAGES = 1 << 12;
        const DIRECT_MESSAGE_REACTIONS = 1 << 13;
        const DIRECT_MESSAGE_TYPING = 1 << 14;
        /// Privileged.
        const MESSAGE_CONTENT = 1 << 15;
        const GUILD_SCHEDULED_EVENTS = 1 << 16;
        const AUTO_MODERATION_CONFIGURATION = 1 << 20;
        const AUTO_MODERATION_EXECUTION = 1 << 21;
        const GUILD_MESSAGE_POLLS = 1 << 24;
        const DIRECT_MESSAGE_POLLS = 1 << 25;
    }
}

impl Intents {
    pub const PRIVILEGED: Self = Self::GUILD_MEMBERS
        .union(Self::GUILD_PRESENCES)
        .union(Self::MESSAGE_CONTENT);

    pub fn is_privileged(self) -> bool {
        self.intersects(Self::PRIVILEGED)
    }
}

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES.
///
/// Privileged intents (members, presences, message content) are opt-in via
/// `DISCORD_INTENTS`.
pub const DEFAULT_INTENTS: Intents = Intents::GUILDS
    .union(Intents::GUILD_MESSAGES)
    .union(Intents::DIRECT_MESSAGES);

/// Settings shared by the HTTP client and the gateway.
#[derive(Clone)]
pub struct ClientConfig {
    pub token: String,
    pub api_base: String,
    pub cdn_base: String,
    pub user_agent: String,
    /// How many times a request is retried after a 429 or a 5xx on a GET.
    pub max_retries: u32,
    /// Upper bound for any single rate-limit sleep.
    pub max_rate_limit_sleep: Duration,
    pub intents: Intents,
    /// Known up front for bots that answer interactions before READY.
    pub application_id: Option<Id<ApplicationMarker>>,
}

impl ClientConfig {
    /// Config with defaults for everything but the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 5,
            max_rate_limit_sleep: Duration::from_secs(60),
            intents: DEFAULT_INTENTS,
            application_id: None,
        }
    }

    /// Load from the environment (after reading `.env` if present).
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `DISCORD_TOKEN` | bot token (required) |
    /// | `DISCORD_API_BASE` | REST base override |
    /// | `DISCORD_APPLICATION_ID` | application snowflake |
    /// | `DISCORD_INTENTS` | gateway intents as a decimal bitmask |
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Used by [`from_env`](Self::from_env)
    /// and by tests that shouldn't touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("DISCORD_TOKEN is not set".to_string()))?;

        let mut config = Self::new(token.trim());

        if let Some(base) = lookup("DISCORD_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("DISCORD_APPLICATION_ID") {
            let id = raw.trim().parse::<Id<ApplicationMarker>>().map_err(|e| {
                Error::Config(format!("DISCORD_APPLICATION_ID is not a snowflake: {e}"))
            })?;
            config.application_id = Some(id);
        }

        if let Some(raw) = lookup("DISCORD_INTENTS") {
            let bits = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("DISCORD_INTENTS is not a bitmask: {e}")))?;
            config.intents = Intents::from_bits_retain(bits);
        }

        Ok(config)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.cdn_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_rate_limit_sleep(mut self, max: Duration) -> Self {
        self.max_rate_limit_sleep = max;
        self
    }

    pub fn with_application_id(mut self, id: Id<ApplicationMarker>) -> Self {
        self.application_id = Some(id);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("cdn_base", &self.cdn_base)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("max_rate_limit_sleep", &self.max_rate_limit_sleep)
            .field("intents", &self.intents)
            .field("application_id", &self.application_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert!(ClientConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "   ")])).is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = ClientConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.intents, DEFAULT_INTENTS);
        assert!(config.application_id.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_API_BASE", "http://localhost:9000/api/"),
            ("DISCORD_APPLICATION_ID", "1234"),
            ("DISCORD_INTENTS", "33281"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:9000/api");
        assert_eq!(config.application_id.map(Id::get), Some(1234));
        assert_eq!(
            config.intents,
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT
        );
        assert!(config.intents.is_privileged());
        assert!(!DEFAULT_INTENTS.is_privileged());
    }

    #[test]
    fn bad_application_id_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "not-a-number"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DISCORD_APPLICATION_ID"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

//! Typed gateway events.
//!
//! The gateway driver decodes every frame into a [`GatewayPayload`] and then
//! into a [`GatewayEvent`], so the client can pattern-match on typed data
//! instead of raw `(op, t, d)` tuples. Dispatches that fail to decode are
//! logged and surface as [`GatewayEvent::Unknown`] with the raw JSON kept.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::types::application::ApplicationFlags;
use crate::types::component::Component;
use crate::types::entitlement::Entitlement;
use crate::types::guild::{Guild, UnavailableGuild};
use crate::types::id::{
    marker::{ApplicationMarker, ChannelMarker, GuildMarker, MessageMarker},
    Id,
};
use crate::types::interaction::Interaction;
use crate::types::message::Message;
use crate::types::subscription::Subscription;
use crate::types::user::User;

// ---------------------------------------------------------------------------
// Wire frame
// ---------------------------------------------------------------------------

/// One gateway frame.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Option<Value>,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

/// Gateway opcodes this crate sends or handles.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const PRESENCE_UPDATE: u8 = 3;
    pub const RESUME: u8 = 6;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

// ---------------------------------------------------------------------------
// Dispatch payloads
// ---------------------------------------------------------------------------

/// Application fields sent in READY.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReadyApplication {
    pub id: Id<ApplicationMarker>,
    #[serde(default)]
    pub flags: Option<ApplicationFlags>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReadyEvent {
    #[serde(rename = "v")]
    pub version: u8,
    pub user: User,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
    pub session_id: String,
    pub resume_gateway_url: String,
    #[serde(default)]
    pub shard: Option<[u32; 2]>,
    pub application: ReadyApplication,
}

/// MESSAGE_UPDATE, reduced to what view tracking needs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MessageUpdate {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
    /// Absent when the edit left components alone.
    #[serde(default)]
    pub components: Option<Vec<Component>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MessageDelete {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MessageDeleteBulk {
    pub ids: Vec<Id<MessageMarker>>,
    pub channel_id: Id<ChannelMarker>,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
}

// ---------------------------------------------------------------------------
// The top-level event enum
// ---------------------------------------------------------------------------

/// A fully-parsed event coming off the gateway.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayEvent {
    /// Identified; carries the session and application id.
    Ready(Box<ReadyEvent>),

    /// A RESUME replayed every missed event.
    Resumed,

    /// Full guild object, sent lazily after READY and on join.
    GuildCreate(Box<Guild>),

    MessageCreate(Box<Message>),
    MessageUpdate(Box<MessageUpdate>),
    MessageDelete(MessageDelete),
    MessageDeleteBulk(MessageDeleteBulk),

    /// Slash command, autocomplete, component or modal submit.
    InteractionCreate(Box<Interaction>),

    EntitlementCreate(Box<Entitlement>),
    EntitlementUpdate(Box<Entitlement>),
    EntitlementDelete(Box<Entitlement>),

    SubscriptionCreate(Box<Subscription>),
    SubscriptionUpdate(Box<Subscription>),
    SubscriptionDelete(Box<Subscription>),

    /// Op 10, with the heartbeat interval in milliseconds.
    Hello(u64),

    /// Op 11.
    HeartbeatAck,

    /// Op 1: the gateway wants a heartbeat now.
    HeartbeatRequest,

    /// Op 7.
    Reconnect,

    /// Op 9. `true` when the session can still be resumed.
    InvalidSession(bool),

    /// Anything without a typed variant, or that failed to decode.
    Unknown {
        event_name: Option<String>,
        op: u8,
        data: Option<Value>,
    },
}

// ---------------------------------------------------------------------------
// Parsing from a raw GatewayPayload
// ---------------------------------------------------------------------------

impl GatewayEvent {
    /// Convert a frame. Never fails: unrecognised frames become
    /// [`GatewayEvent::Unknown`].
    pub fn from_payload(payload: GatewayPayload) -> Self {
        match payload.op {
            opcode::DISPATCH => Self::parse_dispatch(payload.t, payload.d),
            opcode::HEARTBEAT => Self::HeartbeatRequest,
            opcode::RECONNECT => Self::Reconnect,
            opcode::INVALID_SESSION => {
                Self::InvalidSession(payload.d.as_ref().and_then(Value::as_bool).unwrap_or(false))
            }
            opcode::HELLO => match payload
                .d
                .as_ref()
                .and_then(|d| d.get("heartbeat_interval"))
                .and_then(Value::as_u64)
            {
                Some(interval) => Self::Hello(interval),
                None => Self::Unknown {
                    event_name: None,
                    op: payload.op,
                    data: payload.d,
                },
            },
            opcode::HEARTBEAT_ACK => Self::HeartbeatAck,
            _ => Self::Unknown {
                event_name: payload.t,
                op: payload.op,
                data: payload.d,
            },
        }
    }

    fn parse_dispatch(event_name: Option<String>, data: Option<Value>) -> Self {
        let (Some(name), Some(d)) = (event_name.as_deref(), data.as_ref()) else {
            return Self::Unknown {
                event_name,
                op: opcode::DISPATCH,
                data,
            };
        };

        let event = match name {
            "READY" => typed(name, d, |ready| Self::Ready(Box::new(ready))),
            "RESUMED" => Some(Self::Resumed),
            "GUILD_CREATE" => typed(name, d, |guild| Self::GuildCreate(Box::new(guild))),
            "MESSAGE_CREATE" => typed(name, d, |msg| Self::MessageCreate(Box::new(msg))),
            "MESSAGE_UPDATE" => typed(name, d, |update| Self::MessageUpdate(Box::new(update))),
            "MESSAGE_DELETE" => typed(name, d, Self::MessageDelete),
            "MESSAGE_DELETE_BULK" => typed(name, d, Self::MessageDeleteBulk),
            "INTERACTION_CREATE" => typed(name, d, |i| Self::InteractionCreate(Box::new(i))),
            "ENTITLEMENT_CREATE" => typed(name, d, |e| Self::EntitlementCreate(Box::new(e))),
            "ENTITLEMENT_UPDATE" => typed(name, d, |e| Self::EntitlementUpdate(Box::new(e))),
            "ENTITLEMENT_DELETE" => typed(name, d, |e| Self::EntitlementDelete(Box::new(e))),
            "SUBSCRIPTION_CREATE" => typed(name, d, |s| Self::SubscriptionCreate(Box::new(s))),
            "SUBSCRIPTION_UPDATE" => typed(name, d, |s| Self::SubscriptionUpdate(Box::new(s))),
            "SUBSCRIPTION_DELETE" => typed(name, d, |s| Self::SubscriptionDelete(Box::new(s))),
            _ => None,
        };

        event.unwrap_or(Self::Unknown {
            event_name,
            op: opcode::DISPATCH,
            data,
        })
    }

    /// Dispatch name (`READY`, ...) or a label for control frames.
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(_) => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::MessageUpdate(_) => "MESSAGE_UPDATE",
            Self::MessageDelete(_) => "MESSAGE_DELETE",
            Self::MessageDeleteBulk(_) => "MESSAGE_DELETE_BULK",
            Self::InteractionCreate(_) => "INTERACTION_CREATE",
            Self::EntitlementCreate(_) => "ENTITLEMENT_CREATE",
            Self::EntitlementUpdate(_) => "ENTITLEMENT_UPDATE",
            Self::EntitlementDelete(_) => "ENTITLEMENT_DELETE",
            Self::SubscriptionCreate(_) => "SUBSCRIPTION_CREATE",
            Self::SubscriptionUpdate(_) => "SUBSCRIPTION_UPDATE",
            Self::SubscriptionDelete(_) => "SUBSCRIPTION_DELETE",
            Self::Hello(_) => "HELLO",
            Self::HeartbeatAck => "HEARTBEAT_ACK",
            Self::HeartbeatRequest => "HEARTBEAT",
            Self::Reconnect => "RECONNECT",
            Self::InvalidSession(_) => "INVALID_SESSION",
            Self::Unknown { event_name, .. } => event_name.as_deref().unwrap_or("UNKNOWN"),
        }
    }

    /// Decode the raw data of an [`Unknown`](Self::Unknown) event.
    pub fn parse_unknown<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Self::Unknown { data: Some(d), .. } => serde_json::from_value(d.clone()).ok(),
            _ => None,
        }
    }
}

fn typed<T: DeserializeOwned>(
    name: &str,
    data: &Value,
    wrap: impl FnOnce(T) -> GatewayEvent,
) -> Option<GatewayEvent> {
    match T::deserialize(data) {
        Ok(value) => Some(wrap(value)),
        Err(e) => {
            warn!(event = name, error = %e, "failed to parse dispatch payload");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::interaction::tests::{interaction_json, user_json};
    use serde_json::json;

    fn dispatch(t: &str, d: Value) -> GatewayEvent {
        GatewayEvent::from_payload(GatewayPayload {
            op: 0,
            d: Some(d),
            s: Some(3),
            t: Some(t.to_string()),
        })
    }

    #[test]
    fn control_frames() {
        let frame: GatewayPayload =
            serde_json::from_str(r#"{"op": 10, "d": {"heartbeat_interval": 41250}}"#).unwrap();
        assert_eq!(GatewayEvent::from_payload(frame), GatewayEvent::Hello(41250));

        let frame: GatewayPayload = serde_json::from_str(r#"{"op": 9, "d": true}"#).unwrap();
        assert_eq!(GatewayEvent::from_payload(frame), GatewayEvent::InvalidSession(true));

        let frame: GatewayPayload = serde_json::from_str(r#"{"op": 11}"#).unwrap();
        assert_eq!(GatewayEvent::from_payload(frame), GatewayEvent::HeartbeatAck);
    }

    #[test]
    fn ready_carries_session() {
        let event = dispatch(
            "READY",
            json!({
                "v": 10,
                "user": user_json("1185352541052792800"),
                "guilds": [{"id": "290926798626357999", "unavailable": true}],
                "session_id": "abc",
                "resume_gateway_url": "wss://gateway-us-east1-b.discord.gg",
                "shard": [0, 1],
                "application": {"id": "1185352541052792800", "flags": 8667136}
            }),
        );
        let GatewayEvent::Ready(ready) = event else {
            panic!("expected READY, got {event:?}");
        };
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.application.id, Id::new(1185352541052792800));
        assert_eq!(ready.guilds.len(), 1);
    }

    #[test]
    fn message_events() {
        let event = dispatch(
            "MESSAGE_UPDATE",
            json!({"id": "5", "channel_id": "6", "components": [
                {"type": 1, "components": [{"type": 2, "style": 1, "custom_id": "x", "label": "X"}]}
            ]}),
        );
        let GatewayEvent::MessageUpdate(update) = event else {
            panic!("expected MESSAGE_UPDATE");
        };
        assert_eq!(update.components.map(|c| c.len()), Some(1));

        assert_eq!(
            dispatch("MESSAGE_DELETE", json!({"id": "5", "channel_id": "6"})),
            GatewayEvent::MessageDelete(MessageDelete {
                id: Id::new(5),
                channel_id: Id::new(6),
                guild_id: None,
            })
        );
    }

    #[test]
    fn interaction_create() {
        let event = dispatch(
            "INTERACTION_CREATE",
            interaction_json(2, json!({"id": "1", "name": "ping", "type": 1})),
        );
        assert_eq!(event.name(), "INTERACTION_CREATE");
        let GatewayEvent::InteractionCreate(interaction) = event else {
            panic!("expected INTERACTION_CREATE");
        };
        assert_eq!(interaction.command_data().map(|d| d.name.as_str()), Some("ping"));
    }

    #[test]
    fn undecodable_dispatch_keeps_raw_data() {
        let event = dispatch("READY", json!({"v": "not a number"}));
        assert!(matches!(
            &event,
            GatewayEvent::Unknown { event_name: Some(name), op: 0, data: Some(_) } if name == "READY"
        ));

        #[derive(Deserialize)]
        struct Typing {
            user_id: String,
        }
        let typing = dispatch("TYPING_START", json!({"user_id": "9", "channel_id": "6"}));
        assert_eq!(typing.name(), "TYPING_START");
        assert_eq!(typing.parse_unknown::<Typing>().map(|t| t.user_id).as_deref(), Some("9"));
    }
}

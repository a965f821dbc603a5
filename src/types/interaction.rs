//! Inbound interactions.
//!
//! The shape of `data` depends on the interaction `type`, so [`Interaction`]
//! is decoded through a raw mirror that keeps `data` as a [`Value`] until
//! the type is known.

use chrono::{DateTime, Duration, Utc};
use serde::{
    de::{Deserializer, Error as DeError},
    Deserialize, Serialize, Serializer,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::types::channel::Channel;
use crate::types::command::{CommandOptionType, CommandType, InteractionContextType};
use crate::types::component::ComponentType;
use crate::types::entitlement::Entitlement;
use crate::types::guild::{Member, PartialGuild, Role};
use crate::types::id::{
    marker::{
        ApplicationMarker, AttachmentMarker, ChannelMarker, CommandMarker, GenericMarker,
        GuildMarker, InteractionMarker, MessageMarker, RoleMarker, SkuMarker, UserMarker,
    },
    Id,
};
use crate::types::message::{Attachment, Message};
use crate::types::permissions::Permissions;
use crate::types::user::User;
use crate::types::util::{is_false, open_enum, ValueExt};

/// How long an interaction token stays valid.
pub const INTERACTION_TOKEN_LIFETIME_MINUTES: i64 = 15;

open_enum! {
    pub enum InteractionType {
        Ping = 1,
        ApplicationCommand = 2,
        MessageComponent = 3,
        ApplicationCommandAutocomplete = 4,
        ModalSubmit = 5,
    }
}

/// Users, members, roles, channels, messages and attachments referenced by
/// ids in the interaction data.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ResolvedData {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub users: HashMap<Id<UserMarker>, User>,
    /// Members lack `user`; look it up in `users`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub members: HashMap<Id<UserMarker>, Member>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub roles: HashMap<Id<RoleMarker>, Role>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub channels: HashMap<Id<ChannelMarker>, Channel>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub messages: HashMap<Id<MessageMarker>, Message>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attachments: HashMap<Id<AttachmentMarker>, Attachment>,
}

impl ResolvedData {
    /// Member with its `user` filled in from `users`.
    pub fn member(&self, id: Id<UserMarker>) -> Option<Member> {
        let mut member = self.members.get(&id)?.clone();
        if member.user.is_none() {
            member.user = self.users.get(&id).cloned();
        }
        Some(member)
    }
}

// ---------------------------------------------------------------------------
// Application command data
// ---------------------------------------------------------------------------

/// Value of one option in a command invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOptionValue {
    SubCommand(Vec<CommandDataOption>),
    SubCommandGroup(Vec<CommandDataOption>),
    String(String),
    Integer(i64),
    Boolean(bool),
    User(Id<UserMarker>),
    Channel(Id<ChannelMarker>),
    Role(Id<RoleMarker>),
    Mentionable(Id<GenericMarker>),
    Number(f64),
    Attachment(Id<AttachmentMarker>),
    /// Partial, unvalidated input of the option being autocompleted.
    Focused(String, CommandOptionType),
}

impl CommandOptionValue {
    pub fn kind(&self) -> CommandOptionType {
        match self {
            Self::SubCommand(_) => CommandOptionType::SubCommand,
            Self::SubCommandGroup(_) => CommandOptionType::SubCommandGroup,
            Self::String(_) => CommandOptionType::String,
            Self::Integer(_) => CommandOptionType::Integer,
            Self::Boolean(_) => CommandOptionType::Boolean,
            Self::User(_) => CommandOptionType::User,
            Self::Channel(_) => CommandOptionType::Channel,
            Self::Role(_) => CommandOptionType::Role,
            Self::Mentionable(_) => CommandOptionType::Mentionable,
            Self::Number(_) => CommandOptionType::Number,
            Self::Attachment(_) => CommandOptionType::Attachment,
            Self::Focused(_, kind) => *kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandDataOption {
    pub name: String,
    pub value: CommandOptionValue,
}

#[derive(Deserialize, Serialize)]
struct RawCommandDataOption {
    name: String,
    #[serde(rename = "type")]
    kind: CommandOptionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<CommandDataOption>>,
    #[serde(default, skip_serializing_if = "is_false")]
    focused: bool,
}

fn snowflake_from(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for CommandDataOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCommandDataOption::deserialize(deserializer)?;
        let kind = raw.kind;

        if raw.focused {
            let partial = match raw.value {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            return Ok(Self {
                name: raw.name,
                value: CommandOptionValue::Focused(partial, kind),
            });
        }

        let missing = || D::Error::custom(format!("option {} has no value", raw.name));
        let bad = || D::Error::custom(format!("option {} has an invalid {kind:?} value", raw.name));

        let value = match kind {
            CommandOptionType::SubCommand => {
                CommandOptionValue::SubCommand(raw.options.clone().unwrap_or_default())
            }
            CommandOptionType::SubCommandGroup => {
                CommandOptionValue::SubCommandGroup(raw.options.clone().unwrap_or_default())
            }
            _ => {
                let value = raw.value.as_ref().ok_or_else(missing)?;
                let id = || snowflake_from(value).and_then(Id::<GenericMarker>::new_checked);
                match kind {
                    CommandOptionType::String => {
                        CommandOptionValue::String(value.as_str().ok_or_else(bad)?.to_string())
                    }
                    CommandOptionType::Integer => {
                        CommandOptionValue::Integer(value.as_i64().ok_or_else(bad)?)
                    }
                    CommandOptionType::Boolean => {
                        CommandOptionValue::Boolean(value.as_bool().ok_or_else(bad)?)
                    }
                    CommandOptionType::Number => {
                        CommandOptionValue::Number(value.as_f64().ok_or_else(bad)?)
                    }
                    CommandOptionType::User => {
                        CommandOptionValue::User(id().ok_or_else(bad)?.cast())
                    }
                    CommandOptionType::Channel => {
                        CommandOptionValue::Channel(id().ok_or_else(bad)?.cast())
                    }
                    CommandOptionType::Role => {
                        CommandOptionValue::Role(id().ok_or_else(bad)?.cast())
                    }
                    CommandOptionType::Mentionable => {
                        CommandOptionValue::Mentionable(id().ok_or_else(bad)?)
                    }
                    CommandOptionType::Attachment => {
                        CommandOptionValue::Attachment(id().ok_or_else(bad)?.cast())
                    }
                    CommandOptionType::SubCommand | CommandOptionType::SubCommandGroup => {
                        return Err(bad())
                    }
                }
            }
        };

        Ok(Self {
            name: raw.name,
            value,
        })
    }
}

impl Serialize for CommandDataOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (value, options, focused) = match &self.value {
            CommandOptionValue::SubCommand(options) | CommandOptionValue::SubCommandGroup(options) => {
                (None, Some(options.clone()), false)
            }
            CommandOptionValue::String(s) => (Some(Value::from(s.clone())), None, false),
            CommandOptionValue::Integer(i) => (Some(Value::from(*i)), None, false),
            CommandOptionValue::Boolean(b) => (Some(Value::from(*b)), None, false),
            CommandOptionValue::Number(n) => (Some(Value::from(*n)), None, false),
            CommandOptionValue::User(id) => (Some(Value::from(id.to_string())), None, false),
            CommandOptionValue::Channel(id) => (Some(Value::from(id.to_string())), None, false),
            CommandOptionValue::Role(id) => (Some(Value::from(id.to_string())), None, false),
            CommandOptionValue::Mentionable(id) => (Some(Value::from(id.to_string())), None, false),
            CommandOptionValue::Attachment(id) => (Some(Value::from(id.to_string())), None, false),
            CommandOptionValue::Focused(partial, _) => (Some(Value::from(partial.clone())), None, true),
        };
        RawCommandDataOption {
            name: self.name.clone(),
            kind: self.value.kind(),
            value,
            options,
            focused,
        }
        .serialize(serializer)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CommandData {
    pub id: Id<CommandMarker>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CommandType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDataOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedData>,
    /// User or message a context menu command was used on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<Id<GenericMarker>>,
    /// Set for guild-registered commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
}

impl CommandData {
    /// The option being autocompleted, searching nested subcommands.
    pub fn focused(&self) -> Option<(&str, &str, CommandOptionType)> {
        fn find(options: &[CommandDataOption]) -> Option<(&str, &str, CommandOptionType)> {
            options.iter().find_map(|option| match &option.value {
                CommandOptionValue::Focused(partial, kind) => {
                    Some((option.name.as_str(), partial.as_str(), *kind))
                }
                CommandOptionValue::SubCommand(nested)
                | CommandOptionValue::SubCommandGroup(nested) => find(nested),
                _ => None,
            })
        }
        find(&self.options)
    }
}

// ---------------------------------------------------------------------------
// Component and modal data
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: ComponentType,
    /// Selected values of a select menu.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedData>,
}

/// A component as echoed back in a modal submission.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmittedComponent {
    ActionRow {
        id: Option<u32>,
        components: Vec<SubmittedComponent>,
    },
    Label {
        id: Option<u32>,
        component: Box<SubmittedComponent>,
    },
    TextInput {
        id: Option<u32>,
        custom_id: String,
        value: String,
    },
    Select {
        id: Option<u32>,
        kind: ComponentType,
        custom_id: String,
        values: Vec<String>,
    },
    TextDisplay {
        id: Option<u32>,
    },
    Unknown(ComponentType, Value),
}

#[derive(Deserialize)]
struct RawSubmitted {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    custom_id: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    values: Vec<String>,
    #[serde(default)]
    components: Vec<SubmittedComponent>,
    #[serde(default)]
    component: Option<Box<SubmittedComponent>>,
}

impl SubmittedComponent {
    pub fn kind(&self) -> ComponentType {
        match self {
            Self::ActionRow { .. } => ComponentType::ActionRow,
            Self::Label { .. } => ComponentType::Label,
            Self::TextInput { .. } => ComponentType::TextInput,
            Self::Select { kind, .. } => *kind,
            Self::TextDisplay { .. } => ComponentType::TextDisplay,
            Self::Unknown(kind, _) => *kind,
        }
    }

    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Self::TextInput { custom_id, .. } | Self::Select { custom_id, .. } => Some(custom_id),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<&SubmittedComponent> {
        match self {
            Self::ActionRow { components, .. } => components.iter().collect(),
            Self::Label { component, .. } => vec![component.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Leaves that carry a value, depth first.
    pub fn leaves(&self) -> Vec<&SubmittedComponent> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(component) = stack.pop() {
            let children = component.children();
            if children.is_empty() {
                out.push(component);
            } else {
                stack.extend(children.into_iter().rev());
            }
        }
        out
    }
}

impl<'de> Deserialize<'de> for SubmittedComponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_u64)
            .and_then(|t| u8::try_from(t).ok())
            .map(ComponentType::from)
            .ok_or_else(|| D::Error::missing_field("type"))?;

        let known = matches!(
            kind,
            ComponentType::ActionRow
                | ComponentType::Label
                | ComponentType::TextInput
                | ComponentType::TextDisplay
        ) || kind.is_select();
        if !known {
            return Ok(Self::Unknown(kind, value));
        }

        let raw: RawSubmitted = value.deserialize_into().map_err(D::Error::custom)?;
        let custom_id = || {
            raw.custom_id
                .clone()
                .ok_or_else(|| D::Error::missing_field("custom_id"))
        };
        Ok(match kind {
            ComponentType::ActionRow => Self::ActionRow {
                id: raw.id,
                components: raw.components,
            },
            ComponentType::Label => Self::Label {
                id: raw.id,
                component: raw
                    .component
                    .ok_or_else(|| D::Error::missing_field("component"))?,
            },
            ComponentType::TextInput => Self::TextInput {
                id: raw.id,
                custom_id: custom_id()?,
                value: raw.value.clone().unwrap_or_default(),
            },
            ComponentType::TextDisplay => Self::TextDisplay { id: raw.id },
            _ => Self::Select {
                id: raw.id,
                kind,
                custom_id: custom_id()?,
                values: raw.values,
            },
        })
    }
}

impl Serialize for SubmittedComponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = u8::from(self.kind());
        let value = match self {
            Self::ActionRow { id, components } => {
                serde_json::json!({"type": kind, "id": id, "components": components})
            }
            Self::Label { id, component } => {
                serde_json::json!({"type": kind, "id": id, "component": component})
            }
            Self::TextInput {
                id,
                custom_id,
                value,
            } => serde_json::json!({"type": kind, "id": id, "custom_id": custom_id, "value": value}),
            Self::Select {
                id,
                custom_id,
                values,
                ..
            } => serde_json::json!({"type": kind, "id": id, "custom_id": custom_id, "values": values}),
            Self::TextDisplay { id } => serde_json::json!({"type": kind, "id": id}),
            Self::Unknown(_, value) => value.clone(),
        };
        value.serialize(serializer)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModalSubmitData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<SubmittedComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedData>,
}

impl ModalSubmitData {
    /// Every value-carrying leaf in submission order.
    pub fn leaves(&self) -> impl Iterator<Item = &SubmittedComponent> {
        self.components.iter().flat_map(SubmittedComponent::leaves)
    }

    /// Text value submitted for `custom_id`.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.leaves().find_map(|leaf| match leaf {
            SubmittedComponent::TextInput {
                custom_id: id,
                value,
                ..
            } if id == custom_id => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InteractionData {
    ApplicationCommand(Box<CommandData>),
    MessageComponent(ComponentData),
    ModalSubmit(ModalSubmitData),
}

impl InteractionData {
    fn decode(kind: InteractionType, value: Value) -> serde_json::Result<Option<Self>> {
        Ok(match kind {
            InteractionType::Ping | InteractionType::Unknown(_) => None,
            InteractionType::ApplicationCommand | InteractionType::ApplicationCommandAutocomplete => {
                Some(Self::ApplicationCommand(Box::new(value.deserialize_into()?)))
            }
            InteractionType::MessageComponent => Some(Self::MessageComponent(value.deserialize_into()?)),
            InteractionType::ModalSubmit => Some(Self::ModalSubmit(value.deserialize_into()?)),
        })
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Interaction {
    pub id: Id<InteractionMarker>,
    pub application_id: Id<ApplicationMarker>,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild: Option<PartialGuild>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Id<ChannelMarker>>,
    /// Invoking member, in guilds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    /// Invoking user, outside guilds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub token: String,
    pub version: u8,
    /// Message the component was attached to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_locale: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entitlements: Vec<Entitlement>,
    /// Keyed by the stringified integration type.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub authorizing_integration_owners: HashMap<String, Id<GenericMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<InteractionContextType>,
}

#[derive(Deserialize)]
struct RawInteraction {
    id: Id<InteractionMarker>,
    application_id: Id<ApplicationMarker>,
    #[serde(rename = "type")]
    kind: InteractionType,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    guild: Option<PartialGuild>,
    #[serde(default)]
    guild_id: Option<Id<GuildMarker>>,
    #[serde(default)]
    channel: Option<Channel>,
    #[serde(default)]
    channel_id: Option<Id<ChannelMarker>>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<User>,
    token: String,
    #[serde(default = "default_version")]
    version: u8,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    app_permissions: Option<Permissions>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    guild_locale: Option<String>,
    #[serde(default)]
    entitlements: Vec<Entitlement>,
    #[serde(default)]
    authorizing_integration_owners: HashMap<String, Id<GenericMarker>>,
    #[serde(default)]
    context: Option<InteractionContextType>,
}

fn default_version() -> u8 {
    1
}

impl<'de> Deserialize<'de> for Interaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawInteraction::deserialize(deserializer)?;
        let data = match raw.data {
            Some(Value::Null) | None => None,
            Some(value) => InteractionData::decode(raw.kind, value).map_err(D::Error::custom)?,
        };
        Ok(Self {
            id: raw.id,
            application_id: raw.application_id,
            kind: raw.kind,
            data,
            guild: raw.guild,
            guild_id: raw.guild_id,
            channel: raw.channel,
            channel_id: raw.channel_id,
            member: raw.member,
            user: raw.user,
            token: raw.token,
            version: raw.version,
            message: raw.message,
            app_permissions: raw.app_permissions,
            locale: raw.locale,
            guild_locale: raw.guild_locale,
            entitlements: raw.entitlements,
            authorizing_integration_owners: raw.authorizing_integration_owners,
            context: raw.context,
        })
    }
}

impl Interaction {
    /// The user who triggered the interaction, in a guild or not.
    pub fn author(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn author_id(&self) -> Option<Id<UserMarker>> {
        self.author().map(|user| user.id)
    }

    pub fn is_guild(&self) -> bool {
        self.guild_id.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// When the token stops accepting followups.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at() + Duration::minutes(INTERACTION_TOKEN_LIFETIME_MINUTES)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Whether the invoking user or guild owns an active entitlement to `sku`.
    pub fn has_entitlement(&self, sku: Id<SkuMarker>) -> bool {
        let now = Utc::now();
        self.entitlements
            .iter()
            .any(|e| e.sku_id == sku && e.is_active_at(now))
    }

    /// Permissions of the invoking member in the channel.
    pub fn member_permissions(&self) -> Option<Permissions> {
        self.member.as_ref().and_then(|member| member.permissions)
    }

    pub fn command_data(&self) -> Option<&CommandData> {
        match &self.data {
            Some(InteractionData::ApplicationCommand(data)) => Some(data),
            _ => None,
        }
    }

    pub fn component_data(&self) -> Option<&ComponentData> {
        match &self.data {
            Some(InteractionData::MessageComponent(data)) => Some(data),
            _ => None,
        }
    }

    pub fn modal_data(&self) -> Option<&ModalSubmitData> {
        match &self.data {
            Some(InteractionData::ModalSubmit(data)) => Some(data),
            _ => None,
        }
    }

    /// Custom id of the component or modal.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.data {
            Some(InteractionData::MessageComponent(data)) => Some(&data.custom_id),
            Some(InteractionData::ModalSubmit(data)) => Some(&data.custom_id),
            _ => None,
        }
    }

    pub fn message_id(&self) -> Option<Id<MessageMarker>> {
        self.message.as_ref().map(|message| message.id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::channel::ChannelType;
    use serde_json::json;

    pub(crate) fn user_json(id: &str) -> Value {
        json!({"id": id, "username": "tester", "discriminator": "0", "avatar": null})
    }

    pub(crate) fn interaction_json(kind: u8, data: Value) -> Value {
        json!({
            "id": "1185352541052792852",
            "application_id": "1185352541052792800",
            "type": kind,
            "data": data,
            "guild_id": "290926798626357999",
            "channel_id": "645027906669510667",
            "member": {
                "user": user_json("53908232506183680"),
                "roles": [],
                "joined_at": "2017-03-13T19:19:14.040000+00:00",
                "permissions": "2147483647",
                "deaf": false,
                "mute": false
            },
            "token": "A_UNIQUE_TOKEN",
            "version": 1,
            "app_permissions": "442368",
            "locale": "en-US",
            "entitlements": [],
            "authorizing_integration_owners": {"0": "290926798626357999"},
            "context": 0
        })
    }

    #[test]
    fn slash_command_with_subcommand() {
        let interaction: Interaction = serde_json::from_value(interaction_json(
            2,
            json!({
                "id": "771825006014889984",
                "name": "settings",
                "type": 1,
                "options": [{
                    "name": "volume",
                    "type": 1,
                    "options": [
                        {"name": "level", "type": 4, "value": 7},
                        {"name": "target", "type": 6, "value": "53908232506183680"}
                    ]
                }]
            }),
        ))
        .unwrap();
        let data = interaction.command_data().unwrap();
        let CommandOptionValue::SubCommand(options) = &data.options[0].value else {
            panic!("expected subcommand");
        };
        assert_eq!(options[0].value, CommandOptionValue::Integer(7));
        assert_eq!(options[1].value, CommandOptionValue::User(Id::new(53908232506183680)));
        assert_eq!(interaction.author().unwrap().id, Id::new(53908232506183680));
        assert!(interaction.is_guild());
        assert_eq!(interaction.context, Some(InteractionContextType::Guild));
    }

    #[test]
    fn autocomplete_focused_option() {
        let interaction: Interaction = serde_json::from_value(interaction_json(
            4,
            json!({
                "id": "771825006014889984",
                "name": "search",
                "type": 1,
                "options": [
                    {"name": "query", "type": 3, "value": "ru", "focused": true},
                    {"name": "limit", "type": 4, "value": 5}
                ]
            }),
        ))
        .unwrap();
        let focused = interaction.command_data().unwrap().focused();
        assert_eq!(focused, Some(("query", "ru", CommandOptionType::String)));
    }

    #[test]
    fn component_interaction() {
        let mut value = interaction_json(
            3,
            json!({"custom_id": "pick", "component_type": 3, "values": ["a", "b"]}),
        );
        value["message"] = json!({
            "id": "1185352541052792999",
            "channel_id": "645027906669510667",
            "author": user_json("1185352541052792800"),
            "content": "",
            "components": []
        });
        let interaction: Interaction = serde_json::from_value(value).unwrap();
        let data = interaction.component_data().unwrap();
        assert_eq!(data.values, vec!["a", "b"]);
        assert_eq!(data.component_type, ComponentType::StringSelect);
        assert_eq!(interaction.custom_id(), Some("pick"));
        assert_eq!(interaction.message_id(), Some(Id::new(1185352541052792999)));
    }

    #[test]
    fn modal_submit_tree() {
        let interaction: Interaction = serde_json::from_value(interaction_json(
            5,
            json!({
                "custom_id": "feedback",
                "components": [
                    {"type": 1, "id": 1, "components": [
                        {"type": 4, "id": 2, "custom_id": "title", "value": "Great bot"}
                    ]},
                    {"type": 18, "id": 3, "component":
                        {"type": 3, "id": 4, "custom_id": "rating", "values": ["5"]}
                    },
                    {"type": 10, "id": 5},
                    {"type": 99, "id": 6, "custom_id": "future"}
                ]
            }),
        ))
        .unwrap();
        let data = interaction.modal_data().unwrap();
        assert_eq!(data.value("title"), Some("Great bot"));
        let leaves: Vec<_> = data.leaves().map(|c| c.kind()).collect();
        assert_eq!(
            leaves,
            vec![
                ComponentType::TextInput,
                ComponentType::StringSelect,
                ComponentType::TextDisplay,
                ComponentType::Unknown(99)
            ]
        );
    }

    #[test]
    fn ping_has_no_data() {
        let mut value = interaction_json(1, Value::Null);
        value.as_object_mut().unwrap().remove("member");
        let interaction: Interaction = serde_json::from_value(value).unwrap();
        assert!(interaction.data.is_none());
        assert!(interaction.author().is_none());
    }

    #[test]
    fn expiry_is_fifteen_minutes() {
        let interaction: Interaction =
            serde_json::from_value(interaction_json(1, Value::Null)).unwrap();
        assert_eq!(
            interaction.expires_at() - interaction.created_at(),
            Duration::minutes(15)
        );
    }

    #[test]
    fn entitlement_check() {
        let mut value = interaction_json(1, Value::Null);
        value["entitlements"] = json!([{
            "id": "1", "sku_id": "42", "application_id": "1185352541052792800",
            "type": 8, "deleted": false, "starts_at": null, "ends_at": null
        }]);
        let interaction: Interaction = serde_json::from_value(value).unwrap();
        assert!(interaction.has_entitlement(Id::new(42)));
        assert!(!interaction.has_entitlement(Id::new(43)));
    }

    #[test]
    fn resolved_member_gets_user() {
        let resolved: ResolvedData = serde_json::from_value(json!({
            "users": {"7": user_json("7")},
            "members": {"7": {"roles": [], "nick": "seven", "permissions": "0"}}
        }))
        .unwrap();
        let member = resolved.member(Id::new(7)).unwrap();
        assert_eq!(member.user.unwrap().id, Id::new(7));
        assert_eq!(member.nick.as_deref(), Some("seven"));
    }

    #[test]
    fn unknown_values_do_not_drop_the_interaction() {
        let mut value = interaction_json(2, json!({"id": "1", "name": "ping", "type": 1}));
        value["channel"] = json!({"id": "645027906669510667", "type": 99});
        value["context"] = json!(7);
        value["entitlements"] = json!([{
            "id": "1019653849998299136",
            "sku_id": "1019475255913222144",
            "application_id": "1185352541052792800",
            "type": 9
        }]);
        let interaction: Interaction = serde_json::from_value(value).unwrap();
        assert_eq!(
            interaction.channel.as_ref().map(|c| c.kind),
            Some(ChannelType::Unknown(99))
        );
        assert_eq!(interaction.context, Some(InteractionContextType::Unknown(7)));
        assert_eq!(interaction.command_data().map(|d| d.name.as_str()), Some("ping"));
    }

    #[test]
    fn unknown_interaction_type_has_no_data() {
        let interaction: Interaction =
            serde_json::from_value(interaction_json(6, json!({"something": "new"}))).unwrap();
        assert_eq!(interaction.kind, InteractionType::Unknown(6));
        assert!(interaction.data.is_none());
    }
}

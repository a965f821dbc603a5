//! Application command registration payloads.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::collections::HashMap;

use crate::types::application::IntegrationType;
use crate::types::channel::ChannelType;
use crate::types::id::{
    marker::{ApplicationMarker, CommandMarker, CommandVersionMarker, GuildMarker},
    Id,
};
use crate::types::permissions::Permissions;
use crate::types::util::open_enum;

#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum CommandType {
    /// Slash command.
    #[default]
    ChatInput = 1,
    User = 2,
    Message = 3,
    PrimaryEntryPoint = 4,
}

#[derive(Clone, Copy, Debug, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum CommandOptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl CommandOptionType {
    pub fn is_subcommand(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

open_enum! {
    /// Where a command can be used.
    pub enum InteractionContextType {
        Guild = 0,
        BotDm = 1,
        PrivateChannel = 2,
    }
}

/// Choice value; the variant must match the option type.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOptionChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl From<&str> for CommandOptionChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CommandOptionChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for CommandOptionChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CommandOptionChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CommandOptionChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<HashMap<String, String>>,
    pub value: CommandOptionChoiceValue,
}

impl CommandOptionChoice {
    pub fn new(name: impl Into<String>, value: impl Into<CommandOptionChoiceValue>) -> Self {
        Self {
            name: name.into(),
            name_localizations: None,
            value: value.into(),
        }
    }
}

/// Bound of an integer or number option.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumberBound {
    Integer(i64),
    Float(f64),
}

impl NumberBound {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: CommandOptionType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<HashMap<String, String>>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<CommandOptionChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CommandOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<ChannelType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<NumberBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<NumberBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
}

impl CommandOption {
    pub fn new(kind: CommandOptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            name_localizations: None,
            description: description.into(),
            description_localizations: None,
            required: None,
            choices: None,
            options: None,
            channel_types: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: None,
        }
    }
}

/// A registered (or to-be-registered) application command.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ApplicationCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id<CommandMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Id<ApplicationMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(rename = "type", default)]
    pub kind: CommandType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<HashMap<String, String>>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub default_member_permissions: Option<Permissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_types: Option<Vec<IntegrationType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<InteractionContextType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Id<CommandVersionMarker>>,
}

impl ApplicationCommand {
    /// `</name:id>` mention for slash commands that have been registered.
    pub fn mention(&self) -> Option<String> {
        self.id.map(|id| format!("</{}:{id}>", self.name))
    }
}

/// Builder for [`ApplicationCommand`].
///
/// ```ignore
/// let cmd = ApplicationCommandBuilder::chat_input("ping", "Check bot latency").build();
/// ```
pub struct ApplicationCommandBuilder {
    inner: ApplicationCommand,
}

impl ApplicationCommandBuilder {
    fn with_kind(kind: CommandType, name: String, description: String) -> Self {
        Self {
            inner: ApplicationCommand {
                id: None,
                application_id: None,
                guild_id: None,
                kind,
                name,
                name_localizations: None,
                description,
                description_localizations: None,
                options: Vec::new(),
                default_member_permissions: None,
                nsfw: None,
                integration_types: None,
                contexts: None,
                version: None,
            },
        }
    }

    /// Start building a CHAT_INPUT (slash) command.
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(CommandType::ChatInput, name.into(), description.into())
    }

    /// Start building a USER context-menu command.
    pub fn user(name: impl Into<String>) -> Self {
        Self::with_kind(CommandType::User, name.into(), String::new())
    }

    /// Start building a MESSAGE context-menu command.
    pub fn message(name: impl Into<String>) -> Self {
        Self::with_kind(CommandType::Message, name.into(), String::new())
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.inner.options.push(option);
        self
    }

    /// Add an option with just a name, description, type, and required flag.
    pub fn simple_option(
        self,
        kind: CommandOptionType,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let mut option = CommandOption::new(kind, name, description);
        option.required = Some(required);
        self.option(option)
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.inner.nsfw = Some(nsfw);
        self
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.inner.default_member_permissions = Some(permissions);
        self
    }

    pub fn contexts(mut self, contexts: Vec<InteractionContextType>) -> Self {
        self.inner.contexts = Some(contexts);
        self
    }

    pub fn integration_types(mut self, types: Vec<IntegrationType>) -> Self {
        self.inner.integration_types = Some(types);
        self
    }

    pub fn name_localizations(mut self, localizations: HashMap<String, String>) -> Self {
        self.inner.name_localizations = Some(localizations);
        self
    }

    pub fn description_localizations(mut self, localizations: HashMap<String, String>) -> Self {
        self.inner.description_localizations = Some(localizations);
        self
    }

    pub fn guild(mut self, guild_id: Id<GuildMarker>) -> Self {
        self.inner.guild_id = Some(guild_id);
        self
    }

    pub fn build(self) -> ApplicationCommand {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_input_builder() {
        let cmd = ApplicationCommandBuilder::chat_input("roll", "Roll a dice")
            .simple_option(CommandOptionType::Integer, "sides", "Number of sides", false)
            .build();
        assert_eq!(cmd.kind, CommandType::ChatInput);
        assert_eq!(cmd.options[0].name, "sides");
        assert_eq!(cmd.options[0].required, Some(false));
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "type": 1,
                "name": "roll",
                "description": "Roll a dice",
                "default_member_permissions": null,
                "options": [{"type": 4, "name": "sides", "description": "Number of sides", "required": false}]
            })
        );
    }

    #[test]
    fn context_menu_has_empty_description() {
        let cmd = ApplicationCommandBuilder::user("User Info")
            .contexts(vec![InteractionContextType::Guild])
            .integration_types(vec![IntegrationType::GuildInstall])
            .build();
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["type"], 2);
        assert_eq!(value["description"], "");
        assert_eq!(value["contexts"], json!([0]));
        assert_eq!(value["integration_types"], json!([0]));
    }

    #[test]
    fn choice_values() {
        let choices: Vec<CommandOptionChoice> = serde_json::from_value(json!([
            {"name": "a", "value": "x"},
            {"name": "b", "value": 3},
            {"name": "c", "value": 2.5}
        ]))
        .unwrap();
        assert_eq!(choices[0].value, CommandOptionChoiceValue::String("x".into()));
        assert_eq!(choices[1].value, CommandOptionChoiceValue::Integer(3));
        assert_eq!(choices[2].value, CommandOptionChoiceValue::Number(2.5));
    }

    #[test]
    fn registered_command_mention() {
        let cmd: ApplicationCommand = serde_json::from_value(json!({
            "id": "1049462331405066240",
            "application_id": "5",
            "version": "1049462331405066241",
            "type": 1,
            "name": "ping",
            "description": "pong",
            "default_member_permissions": "8"
        }))
        .unwrap();
        assert_eq!(cmd.mention().as_deref(), Some("</ping:1049462331405066240>"));
        assert_eq!(cmd.default_member_permissions, Some(Permissions::ADMINISTRATOR));
    }
}

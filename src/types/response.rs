//! Interaction callback bodies (`POST /interactions/{id}/{token}/callback`).

use serde::{Deserialize, Serialize};
use serde_repr::Serialize_repr;

use crate::types::command::CommandOptionChoice;
use crate::types::component::Component;
use crate::types::message::{
    partial_attachments, AllowedMentions, AttachmentFile, CreateMessage, Embed, MessageFlags,
};
use crate::types::util::is_false;

/// Autocomplete results are capped at this many choices.
pub const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

#[derive(Clone, Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionCallbackType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionCallbackData>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum InteractionCallbackType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    ApplicationCommandAutocompleteResult = 8,
    Modal = 9,
    LaunchActivity = 12,
}

impl<'de> Deserialize<'de> for InteractionCallbackType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = u8::deserialize(deserializer)?;
        match v {
            1 => Ok(Self::Pong),
            4 => Ok(Self::ChannelMessageWithSource),
            5 => Ok(Self::DeferredChannelMessageWithSource),
            6 => Ok(Self::DeferredUpdateMessage),
            7 => Ok(Self::UpdateMessage),
            8 => Ok(Self::ApplicationCommandAutocompleteResult),
            9 => Ok(Self::Modal),
            12 => Ok(Self::LaunchActivity),
            _ => Err(serde::de::Error::custom(format!(
                "unknown interaction callback type: {v}"
            ))),
        }
    }
}

/// Callback payload. Message fields, modal fields and autocomplete choices
/// share one struct; unset fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InteractionCallbackData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(skip_serializing_if = "MessageFlags::is_empty")]
    pub flags: MessageFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<CommandOptionChoice>>,
    #[serde(skip)]
    pub files: Vec<AttachmentFile>,
}

impl InteractionCallbackData {
    pub(crate) fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if !self.files.is_empty() {
            if let serde_json::Value::Object(map) = &mut value {
                map.insert(
                    "attachments".to_string(),
                    serde_json::to_value(partial_attachments(&self.files))?,
                );
            }
        }
        Ok(value)
    }
}

impl From<CreateMessage> for InteractionCallbackData {
    fn from(message: CreateMessage) -> Self {
        Self {
            content: message.content,
            tts: message.tts,
            embeds: (!message.embeds.is_empty()).then_some(message.embeds),
            components: message.components,
            allowed_mentions: message.allowed_mentions,
            flags: message.flags,
            files: message.files,
            ..Self::default()
        }
    }
}

impl InteractionResponse {
    fn with(kind: InteractionCallbackType, data: InteractionCallbackData) -> Self {
        Self {
            kind,
            data: Some(data),
        }
    }

    pub fn pong() -> Self {
        Self {
            kind: InteractionCallbackType::Pong,
            data: None,
        }
    }

    pub fn message(message: impl Into<InteractionCallbackData>) -> Self {
        Self::with(InteractionCallbackType::ChannelMessageWithSource, message.into())
    }

    /// Plain text visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::with(
            InteractionCallbackType::ChannelMessageWithSource,
            InteractionCallbackData {
                content: Some(content.into()),
                flags: MessageFlags::EPHEMERAL,
                ..Default::default()
            },
        )
    }

    /// Edit the message a component is attached to.
    pub fn update(message: impl Into<InteractionCallbackData>) -> Self {
        Self::with(InteractionCallbackType::UpdateMessage, message.into())
    }

    /// Acknowledge now and respond later. `update` selects the deferred
    /// message-edit form used for components.
    pub fn deferred(ephemeral: bool, update: bool) -> Self {
        let kind = if update {
            InteractionCallbackType::DeferredUpdateMessage
        } else {
            InteractionCallbackType::DeferredChannelMessageWithSource
        };
        if ephemeral && !update {
            Self::with(
                kind,
                InteractionCallbackData {
                    flags: MessageFlags::EPHEMERAL,
                    ..Default::default()
                },
            )
        } else {
            Self { kind, data: None }
        }
    }

    pub fn modal(
        custom_id: impl Into<String>,
        title: impl Into<String>,
        components: Vec<Component>,
    ) -> Self {
        Self::with(
            InteractionCallbackType::Modal,
            InteractionCallbackData {
                custom_id: Some(custom_id.into()),
                title: Some(title.into()),
                components: Some(components),
                ..Default::default()
            },
        )
    }

    /// Choices beyond the 25th are dropped.
    pub fn autocomplete(mut choices: Vec<CommandOptionChoice>) -> Self {
        choices.truncate(MAX_AUTOCOMPLETE_CHOICES);
        Self::with(
            InteractionCallbackType::ApplicationCommandAutocompleteResult,
            InteractionCallbackData {
                choices: Some(choices),
                ..Default::default()
            },
        )
    }

    pub fn launch_activity() -> Self {
        Self {
            kind: InteractionCallbackType::LaunchActivity,
            data: None,
        }
    }

    pub(crate) fn files(&self) -> &[AttachmentFile] {
        self.data.as_ref().map_or(&[][..], |data| data.files.as_slice())
    }

    /// JSON body including attachment metadata for uploaded files.
    pub(crate) fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::json!({ "type": self.kind });
        if let Some(data) = &self.data {
            value["data"] = data.payload_json()?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn callback_type_accepts_known_codes() {
        let parsed: InteractionCallbackType = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, InteractionCallbackType::LaunchActivity);
        assert!(serde_json::from_str::<InteractionCallbackType>("2").is_err());
    }

    #[test]
    fn ephemeral_message() {
        let value = serde_json::to_value(InteractionResponse::ephemeral("hidden")).unwrap();
        assert_eq!(value, json!({"type": 4, "data": {"content": "hidden", "flags": 64}}));
    }

    #[test]
    fn deferred_variants() {
        let thinking = serde_json::to_value(InteractionResponse::deferred(true, false)).unwrap();
        assert_eq!(thinking, json!({"type": 5, "data": {"flags": 64}}));

        let update = serde_json::to_value(InteractionResponse::deferred(true, true)).unwrap();
        assert_eq!(update, json!({"type": 6}));
    }

    #[test]
    fn autocomplete_is_truncated() {
        let choices = (0..30)
            .map(|i| CommandOptionChoice::new(format!("c{i}"), i as i64))
            .collect();
        let response = InteractionResponse::autocomplete(choices);
        let data = response.data.unwrap();
        assert_eq!(data.choices.unwrap().len(), MAX_AUTOCOMPLETE_CHOICES);
    }

    #[test]
    fn from_create_message_keeps_files() {
        let message = CreateMessage::new()
            .content("report")
            .file(AttachmentFile::new("report.txt", b"hi".to_vec()));
        let response = InteractionResponse::message(message);
        assert_eq!(response.files().len(), 1);
        let body = response.payload_json().unwrap();
        assert_eq!(body["data"]["attachments"][0]["filename"], "report.txt");
        assert!(body["data"].get("embeds").is_none());
    }

    #[test]
    fn modal_body() {
        let value =
            serde_json::to_value(InteractionResponse::modal("fb", "Feedback", vec![])).unwrap();
        assert_eq!(
            value,
            json!({"type": 9, "data": {"custom_id": "fb", "title": "Feedback", "components": []}})
        );
    }
}

//! Message and modal components.
//!
//! Components are tagged by an integer `type` field. [`Component`] buffers
//! the object into a [`Value`], reads the tag and decodes the rest with
//! [`ValueExt::deserialize_into`]. Tags this crate does not know yet are
//! kept verbatim in [`Component::Unknown`] so they survive a round trip
//! through a view refresh.

use serde::{
    de::{Deserializer, Error as DeError},
    ser::{Error as SerError, Serializer},
    Deserialize, Serialize,
};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::types::channel::ChannelType;
use crate::types::emoji::PartialEmoji;
use crate::types::id::{
    marker::{GenericMarker, SkuMarker},
    Id,
};
use crate::types::util::{is_false, ValueExt};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "u8", into = "u8")]
pub enum ComponentType {
    ActionRow,
    Button,
    StringSelect,
    TextInput,
    UserSelect,
    RoleSelect,
    MentionableSelect,
    ChannelSelect,
    Section,
    TextDisplay,
    Thumbnail,
    MediaGallery,
    File,
    Separator,
    Container,
    Label,
    Unknown(u8),
}

impl From<u8> for ComponentType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::ActionRow,
            2 => Self::Button,
            3 => Self::StringSelect,
            4 => Self::TextInput,
            5 => Self::UserSelect,
            6 => Self::RoleSelect,
            7 => Self::MentionableSelect,
            8 => Self::ChannelSelect,
            9 => Self::Section,
            10 => Self::TextDisplay,
            11 => Self::Thumbnail,
            12 => Self::MediaGallery,
            13 => Self::File,
            14 => Self::Separator,
            17 => Self::Container,
            18 => Self::Label,
            other => Self::Unknown(other),
        }
    }
}

impl From<ComponentType> for u8 {
    fn from(value: ComponentType) -> Self {
        match value {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::StringSelect => 3,
            ComponentType::TextInput => 4,
            ComponentType::UserSelect => 5,
            ComponentType::RoleSelect => 6,
            ComponentType::MentionableSelect => 7,
            ComponentType::ChannelSelect => 8,
            ComponentType::Section => 9,
            ComponentType::TextDisplay => 10,
            ComponentType::Thumbnail => 11,
            ComponentType::MediaGallery => 12,
            ComponentType::File => 13,
            ComponentType::Separator => 14,
            ComponentType::Container => 17,
            ComponentType::Label => 18,
            ComponentType::Unknown(other) => other,
        }
    }
}

impl ComponentType {
    pub fn is_select(self) -> bool {
        matches!(
            self,
            Self::StringSelect
                | Self::UserSelect
                | Self::RoleSelect
                | Self::MentionableSelect
                | Self::ChannelSelect
        )
    }

    /// Layout and content components that need the
    /// `IS_COMPONENTS_V2` message flag.
    pub fn is_v2(self) -> bool {
        matches!(
            self,
            Self::Section
                | Self::TextDisplay
                | Self::Thumbnail
                | Self::MediaGallery
                | Self::File
                | Self::Separator
                | Self::Container
                | Self::Label
        )
    }
}

// ---------------------------------------------------------------------------
// Interactive components
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum ButtonStyle {
    #[default]
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
    Link = 5,
    /// Purchase button for a SKU. Carries only `sku_id`.
    Premium = 6,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Button {
    pub style: ButtonStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<Id<SkuMarker>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Which entity a select menu picks from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectMenuType {
    #[default]
    String,
    User,
    Role,
    Mentionable,
    Channel,
}

impl SelectMenuType {
    pub fn component_type(self) -> ComponentType {
        match self {
            Self::String => ComponentType::StringSelect,
            Self::User => ComponentType::UserSelect,
            Self::Role => ComponentType::RoleSelect,
            Self::Mentionable => ComponentType::MentionableSelect,
            Self::Channel => ComponentType::ChannelSelect,
        }
    }

    pub fn from_component_type(kind: ComponentType) -> Option<Self> {
        match kind {
            ComponentType::StringSelect => Some(Self::String),
            ComponentType::UserSelect => Some(Self::User),
            ComponentType::RoleSelect => Some(Self::Role),
            ComponentType::MentionableSelect => Some(Self::Mentionable),
            ComponentType::ChannelSelect => Some(Self::Channel),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectMenu {
    /// Set from the component `type` tag.
    #[serde(skip)]
    pub kind: SelectMenuType,
    pub custom_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<ChannelType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_values: Vec<SelectDefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Only meaningful inside modals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn emoji(mut self, emoji: impl Into<PartialEmoji>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn default_selected(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectDefaultValueType {
    User,
    Role,
    Channel,
}

/// Pre-selected entity of an auto-populated select.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SelectDefaultValue {
    pub id: Id<GenericMarker>,
    #[serde(rename = "type")]
    pub kind: SelectDefaultValueType,
}

#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum TextInputStyle {
    #[default]
    Short = 1,
    Paragraph = 2,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TextInput {
    pub custom_id: String,
    pub style: TextInputStyle,
    /// Omitted when the input is wrapped in a [`Label`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

// ---------------------------------------------------------------------------
// Layout and content components
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ActionRow {
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Section {
    pub components: Vec<Component>,
    pub accessory: Box<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TextDisplay {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Media reference; `url` may be `attachment://name` for uploads.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UnfurledMediaItem {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl UnfurledMediaItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Thumbnail {
    pub media: UnfurledMediaItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MediaGalleryItem {
    pub media: UnfurledMediaItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MediaGallery {
    pub items: Vec<MediaGalleryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileComponent {
    pub file: UnfurledMediaItem,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum SeparatorSpacing {
    #[default]
    Small = 1,
    Large = 2,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Separator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divider: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SeparatorSpacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Container {
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Modal wrapper giving an input a label and description.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Label {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub component: Box<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    ActionRow(ActionRow),
    Button(Button),
    SelectMenu(SelectMenu),
    TextInput(TextInput),
    Section(Section),
    TextDisplay(TextDisplay),
    Thumbnail(Thumbnail),
    MediaGallery(MediaGallery),
    File(FileComponent),
    Separator(Separator),
    Container(Container),
    Label(Label),
    /// A component type this crate does not model, kept as received.
    Unknown(ComponentType, Value),
}

impl Component {
    pub fn kind(&self) -> ComponentType {
        match self {
            Self::ActionRow(_) => ComponentType::ActionRow,
            Self::Button(_) => ComponentType::Button,
            Self::SelectMenu(select) => select.kind.component_type(),
            Self::TextInput(_) => ComponentType::TextInput,
            Self::Section(_) => ComponentType::Section,
            Self::TextDisplay(_) => ComponentType::TextDisplay,
            Self::Thumbnail(_) => ComponentType::Thumbnail,
            Self::MediaGallery(_) => ComponentType::MediaGallery,
            Self::File(_) => ComponentType::File,
            Self::Separator(_) => ComponentType::Separator,
            Self::Container(_) => ComponentType::Container,
            Self::Label(_) => ComponentType::Label,
            Self::Unknown(kind, _) => *kind,
        }
    }

    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Self::Button(button) => button.custom_id.as_deref(),
            Self::SelectMenu(select) => Some(&select.custom_id),
            Self::TextInput(input) => Some(&input.custom_id),
            Self::Unknown(_, value) => value.get("custom_id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The optional integer `id` Discord assigns to every component.
    pub fn numeric_id(&self) -> Option<u32> {
        match self {
            Self::ActionRow(c) => c.id,
            Self::Button(c) => c.id,
            Self::SelectMenu(c) => c.id,
            Self::TextInput(c) => c.id,
            Self::Section(c) => c.id,
            Self::TextDisplay(c) => c.id,
            Self::Thumbnail(c) => c.id,
            Self::MediaGallery(c) => c.id,
            Self::File(c) => c.id,
            Self::Separator(c) => c.id,
            Self::Container(c) => c.id,
            Self::Label(c) => c.id,
            Self::Unknown(_, value) => value
                .get("id")
                .and_then(Value::as_u64)
                .and_then(|id| u32::try_from(id).ok()),
        }
    }

    /// Direct children, including a section accessory.
    pub fn children(&self) -> Vec<&Component> {
        match self {
            Self::ActionRow(row) => row.components.iter().collect(),
            Self::Section(section) => section
                .components
                .iter()
                .chain(std::iter::once(section.accessory.as_ref()))
                .collect(),
            Self::Container(container) => container.components.iter().collect(),
            Self::Label(label) => vec![label.component.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Depth-first, pre-order traversal of this component and everything
    /// nested in it.
    pub fn walk(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(component) = stack.pop() {
            out.push(component);
            stack.extend(component.children().into_iter().rev());
        }
        out
    }

    /// Number of components counted the way Discord enforces its limit.
    pub fn total_count(&self) -> usize {
        self.walk().len()
    }

    pub fn is_v2(&self) -> bool {
        self.kind().is_v2()
    }
}

/// Walk a list of top-level components depth first.
pub fn walk_components(components: &[Component]) -> impl Iterator<Item = &Component> {
    components.iter().flat_map(Component::walk)
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            Self::ActionRow(c) => serde_json::to_value(c),
            Self::Button(c) => serde_json::to_value(c),
            Self::SelectMenu(c) => serde_json::to_value(c),
            Self::TextInput(c) => serde_json::to_value(c),
            Self::Section(c) => serde_json::to_value(c),
            Self::TextDisplay(c) => serde_json::to_value(c),
            Self::Thumbnail(c) => serde_json::to_value(c),
            Self::MediaGallery(c) => serde_json::to_value(c),
            Self::File(c) => serde_json::to_value(c),
            Self::Separator(c) => serde_json::to_value(c),
            Self::Container(c) => serde_json::to_value(c),
            Self::Label(c) => serde_json::to_value(c),
            Self::Unknown(_, value) => Ok(value.clone()),
        };
        let mut value = value.map_err(S::Error::custom)?;
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::from(u8::from(self.kind())));
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(Value::as_u64)
            .and_then(|t| u8::try_from(t).ok())
            .ok_or_else(|| D::Error::missing_field("type"))?;
        let kind = ComponentType::from(tag);

        let component = match kind {
            ComponentType::ActionRow => Self::ActionRow(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Button => Self::Button(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::TextInput => Self::TextInput(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Section => Self::Section(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::TextDisplay => Self::TextDisplay(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Thumbnail => Self::Thumbnail(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::MediaGallery => Self::MediaGallery(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::File => Self::File(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Separator => Self::Separator(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Container => Self::Container(value.deserialize_into().map_err(D::Error::custom)?),
            ComponentType::Label => Self::Label(value.deserialize_into().map_err(D::Error::custom)?),
            kind if kind.is_select() => {
                let mut select: SelectMenu = value.deserialize_into().map_err(D::Error::custom)?;
                select.kind = SelectMenuType::from_component_type(kind).unwrap_or_default();
                Self::SelectMenu(select)
            }
            kind => Self::Unknown(kind, value),
        };
        Ok(component)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wrap components in an action row.
pub fn action_row(components: Vec<Component>) -> Component {
    Component::ActionRow(ActionRow {
        components,
        id: None,
    })
}

/// A link button (style 5, no custom id).
pub fn link_button(label: impl Into<String>, url: impl Into<String>) -> Component {
    Component::Button(Button {
        style: ButtonStyle::Link,
        label: Some(label.into()),
        url: Some(url.into()),
        ..Button::default()
    })
}

/// A purchase button for a SKU.
pub fn premium_button(sku_id: Id<SkuMarker>) -> Component {
    Component::Button(Button {
        style: ButtonStyle::Premium,
        sku_id: Some(sku_id),
        ..Button::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_row_with_button_and_select() {
        let value = json!({
            "type": 1,
            "components": [
                {"type": 2, "style": 1, "label": "Click", "custom_id": "click_one", "id": 2},
                {"type": 8, "custom_id": "pick", "channel_types": [0, 5], "min_values": 1}
            ]
        });
        let row: Component = serde_json::from_value(value.clone()).unwrap();
        let Component::ActionRow(inner) = &row else {
            panic!("expected action row");
        };
        assert_eq!(inner.components.len(), 2);
        assert_eq!(inner.components[0].custom_id(), Some("click_one"));
        assert_eq!(inner.components[0].numeric_id(), Some(2));
        assert_eq!(inner.components[1].kind(), ComponentType::ChannelSelect);
        assert_eq!(serde_json::to_value(&row).unwrap(), value);
    }

    #[test]
    fn premium_button_serializes_sku_only() {
        assert_eq!(
            serde_json::to_value(premium_button(Id::new(77))).unwrap(),
            json!({"type": 2, "style": 6, "sku_id": "77"})
        );
    }

    #[test]
    fn unknown_component_is_preserved() {
        let value = json!({"type": 99, "custom_id": "future", "id": 4, "shiny": true});
        let component: Component = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(component.kind(), ComponentType::Unknown(99));
        assert_eq!(component.custom_id(), Some("future"));
        assert_eq!(component.numeric_id(), Some(4));
        assert_eq!(serde_json::to_value(&component).unwrap(), value);
    }

    #[test]
    fn walk_is_depth_first() {
        let container: Component = serde_json::from_value(json!({
            "type": 17,
            "accent_color": 16711680,
            "components": [
                {"type": 10, "content": "header", "id": 1},
                {
                    "type": 9,
                    "id": 2,
                    "components": [{"type": 10, "content": "body", "id": 3}],
                    "accessory": {"type": 2, "style": 2, "custom_id": "more", "id": 4}
                },
                {"type": 14, "divider": true, "id": 5},
                {"type": 1, "id": 6, "components": [
                    {"type": 3, "custom_id": "choose", "id": 7, "options": [
                        {"label": "A", "value": "a"}
                    ]}
                ]}
            ]
        }))
        .unwrap();
        let ids: Vec<_> = container.walk().iter().map(|c| c.numeric_id()).collect();
        assert_eq!(
            ids,
            vec![None, Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)]
        );
        assert_eq!(container.total_count(), 8);
        assert!(container.is_v2());
    }

    #[test]
    fn label_wraps_input() {
        let label: Component = serde_json::from_value(json!({
            "type": 18,
            "label": "Your name",
            "description": "As shown on your profile",
            "component": {"type": 4, "custom_id": "name", "style": 1}
        }))
        .unwrap();
        let custom_ids: Vec<_> = label.walk().iter().filter_map(|c| c.custom_id()).collect();
        assert_eq!(custom_ids, vec!["name"]);
    }

    #[test]
    fn missing_type_is_an_error() {
        let result: Result<Component, _> = serde_json::from_value(json!({"custom_id": "x"}));
        assert!(result.is_err());
    }
}

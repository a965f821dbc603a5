//! Layout and content items. They carry no callbacks of their own but may
//! hold interactive children.

use async_trait::async_trait;
use std::any::Any;

use super::button::Button;
use super::item::Item;
use super::select::Select;
use super::text_input::TextInput;
use crate::types::component::{
    self as model, Component, ComponentType, SeparatorSpacing, UnfurledMediaItem,
};

macro_rules! any_methods {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

fn render(items: &[Box<dyn Item>]) -> Vec<Component> {
    items.iter().map(|item| item.to_component()).collect()
}

/// Markdown text.
#[derive(Clone, Debug)]
pub struct TextDisplay {
    content: String,
    id: Option<u32>,
}

impl TextDisplay {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            id: None,
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

#[async_trait]
impl Item for TextDisplay {
    fn component_type(&self) -> ComponentType {
        ComponentType::TextDisplay
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::TextDisplay(model::TextDisplay {
            content: self.content.clone(),
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::TextDisplay(text) = component {
            self.content = text.content.clone();
        }
    }

    any_methods!();
}

#[derive(Clone, Debug, Default)]
pub struct Separator {
    divider: Option<bool>,
    spacing: Option<SeparatorSpacing>,
    id: Option<u32>,
}

impl Separator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn divider(mut self, divider: bool) -> Self {
        self.divider = Some(divider);
        self
    }

    pub fn spacing(mut self, spacing: SeparatorSpacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }
}

#[async_trait]
impl Item for Separator {
    fn component_type(&self) -> ComponentType {
        ComponentType::Separator
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::Separator(model::Separator {
            divider: self.divider,
            spacing: self.spacing,
            id: self.id,
        })
    }

    any_methods!();
}

/// Small image, typically a section accessory.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    media: UnfurledMediaItem,
    description: Option<String>,
    spoiler: bool,
    id: Option<u32>,
}

impl Thumbnail {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            media: UnfurledMediaItem::new(url),
            description: None,
            spoiler: false,
            id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn spoiler(mut self, spoiler: bool) -> Self {
        self.spoiler = spoiler;
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn url(&self) -> &str {
        &self.media.url
    }
}

#[async_trait]
impl Item for Thumbnail {
    fn component_type(&self) -> ComponentType {
        ComponentType::Thumbnail
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::Thumbnail(model::Thumbnail {
            media: self.media.clone(),
            description: self.description.clone(),
            spoiler: self.spoiler,
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::Thumbnail(thumbnail) = component {
            self.media = thumbnail.media.clone();
            self.description = thumbnail.description.clone();
            self.spoiler = thumbnail.spoiler;
        }
    }

    any_methods!();
}

/// Up to three text displays with a button or thumbnail beside them.
pub struct Section {
    items: Vec<Box<dyn Item>>,
    accessory: Box<dyn Item>,
    id: Option<u32>,
}

impl Section {
    pub fn new(accessory: impl Item) -> Self {
        Self {
            items: Vec::new(),
            accessory: Box::new(accessory),
            id: None,
        }
    }

    pub fn text(self, content: impl Into<String>) -> Self {
        self.item(TextDisplay::new(content))
    }

    pub fn item(mut self, item: impl Item) -> Self {
        self.items.push(Box::new(item));
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn accessory(&self) -> &dyn Item {
        &*self.accessory
    }
}

#[async_trait]
impl Item for Section {
    fn component_type(&self) -> ComponentType {
        ComponentType::Section
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::Section(model::Section {
            components: render(&self.items),
            accessory: Box::new(self.accessory.to_component()),
            id: self.id,
        })
    }

    fn children(&self) -> Vec<&Box<dyn Item>> {
        self.items
            .iter()
            .chain(std::iter::once(&self.accessory))
            .collect()
    }

    fn children_mut(&mut self) -> Vec<&mut Box<dyn Item>> {
        self.items
            .iter_mut()
            .chain(std::iter::once(&mut self.accessory))
            .collect()
    }

    any_methods!();
}

/// Boxed group of items with an optional accent colour.
#[derive(Default)]
pub struct Container {
    items: Vec<Box<dyn Item>>,
    accent_color: Option<u32>,
    spoiler: bool,
    id: Option<u32>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: impl Item) -> Self {
        self.items.push(Box::new(item));
        self
    }

    pub fn accent_color(mut self, color: u32) -> Self {
        self.accent_color = Some(color);
        self
    }

    pub fn spoiler(mut self, spoiler: bool) -> Self {
        self.spoiler = spoiler;
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }
}

#[async_trait]
impl Item for Container {
    fn component_type(&self) -> ComponentType {
        ComponentType::Container
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::Container(model::Container {
            components: render(&self.items),
            accent_color: self.accent_color,
            spoiler: self.spoiler,
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::Container(container) = component {
            self.accent_color = container.accent_color;
            self.spoiler = container.spoiler;
        }
    }

    fn children(&self) -> Vec<&Box<dyn Item>> {
        self.items.iter().collect()
    }

    fn children_mut(&mut self) -> Vec<&mut Box<dyn Item>> {
        self.items.iter_mut().collect()
    }

    any_methods!();
}

/// Explicit row of buttons or a single select.
#[derive(Default)]
pub struct ActionRow {
    items: Vec<Box<dyn Item>>,
    id: Option<u32>,
}

impl ActionRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: impl Item) -> Self {
        self.items.push(Box::new(item));
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Combined width of the row's items, out of 5.
    pub(crate) fn used_width(&self) -> u8 {
        self.items
            .iter()
            .fold(0u8, |used, item| used.saturating_add(item.width()))
    }
}

#[async_trait]
impl Item for ActionRow {
    fn component_type(&self) -> ComponentType {
        ComponentType::ActionRow
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::ActionRow(model::ActionRow {
            components: render(&self.items),
            id: self.id,
        })
    }

    fn children(&self) -> Vec<&Box<dyn Item>> {
        self.items.iter().collect()
    }

    fn children_mut(&mut self) -> Vec<&mut Box<dyn Item>> {
        self.items.iter_mut().collect()
    }

    any_methods!();
}

/// Modal wrapper giving an input a label and description.
pub struct Label {
    text: String,
    description: Option<String>,
    component: Box<dyn Item>,
    id: Option<u32>,
}

impl Label {
    pub fn new(text: impl Into<String>, component: impl Item) -> Self {
        Self {
            text: text.into(),
            description: None,
            component: Box::new(component),
            id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl Item for Label {
    fn component_type(&self) -> ComponentType {
        ComponentType::Label
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn to_component(&self) -> Component {
        Component::Label(model::Label {
            label: self.text.clone(),
            description: self.description.clone(),
            component: Box::new(self.component.to_component()),
            id: self.id,
        })
    }

    fn children(&self) -> Vec<&Box<dyn Item>> {
        vec![&self.component]
    }

    fn children_mut(&mut self) -> Vec<&mut Box<dyn Item>> {
        vec![&mut self.component]
    }

    any_methods!();
}

/// A component kept exactly as it was seen on a message, such as a media
/// gallery or a type this crate does not model.
#[derive(Clone, Debug)]
pub(crate) struct Verbatim(Component);

#[async_trait]
impl Item for Verbatim {
    fn component_type(&self) -> ComponentType {
        self.0.kind()
    }

    fn custom_id(&self) -> Option<&str> {
        self.0.custom_id()
    }

    fn numeric_id(&self) -> Option<u32> {
        self.0.numeric_id()
    }

    fn is_dispatchable(&self) -> bool {
        false
    }

    fn to_component(&self) -> Component {
        self.0.clone()
    }

    fn refresh_component(&mut self, component: &Component) {
        if component.kind() == self.0.kind() {
            self.0 = component.clone();
        }
    }

    any_methods!();
}

/// Rebuild a callback-free item tree from a message component.
pub(crate) fn item_from_component(component: &Component) -> Box<dyn Item> {
    let children = |components: &[Component]| {
        components
            .iter()
            .map(item_from_component)
            .collect::<Vec<_>>()
    };
    match component {
        Component::Button(button) => Box::new(Button::from_model(button)),
        Component::SelectMenu(select) => Box::new(Select::from_model(select)),
        Component::TextInput(input) => Box::new(TextInput::from_model(input)),
        Component::TextDisplay(text) => Box::new(TextDisplay {
            content: text.content.clone(),
            id: text.id,
        }),
        Component::Separator(separator) => Box::new(Separator {
            divider: separator.divider,
            spacing: separator.spacing,
            id: separator.id,
        }),
        Component::Thumbnail(thumbnail) => Box::new(Thumbnail {
            media: thumbnail.media.clone(),
            description: thumbnail.description.clone(),
            spoiler: thumbnail.spoiler,
            id: thumbnail.id,
        }),
        Component::Section(section) => Box::new(Section {
            items: children(&section.components),
            accessory: item_from_component(&section.accessory),
            id: section.id,
        }),
        Component::Container(container) => Box::new(Container {
            items: children(&container.components),
            accent_color: container.accent_color,
            spoiler: container.spoiler,
            id: container.id,
        }),
        Component::ActionRow(row) => Box::new(ActionRow {
            items: children(&row.components),
            id: row.id,
        }),
        Component::Label(label) => Box::new(Label {
            text: label.label.clone(),
            description: label.description.clone(),
            component: item_from_component(&label.component),
            id: label.id,
        }),
        other => Box::new(Verbatim(other.clone())),
    }
}

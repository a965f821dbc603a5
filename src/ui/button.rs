use async_trait::async_trait;
use std::any::Any;
use std::future::Future;

use super::generated_custom_id;
use super::item::{item_callback, Item, ItemCallback, ItemContext};
use crate::error::Result;
use crate::types::component::{self as model, ButtonStyle, Component, ComponentType};
use crate::types::emoji::PartialEmoji;
use crate::types::id::{marker::SkuMarker, Id};

/// A clickable button.
///
/// Buttons created with [`Button::new`] get a random custom id and only
/// live as long as their view. Set one with [`Button::custom_id`] to make
/// the button persistent.
pub struct Button {
    style: ButtonStyle,
    label: Option<String>,
    emoji: Option<PartialEmoji>,
    custom_id: String,
    explicit_id: bool,
    url: Option<String>,
    sku_id: Option<Id<SkuMarker>>,
    disabled: bool,
    row: Option<u8>,
    id: Option<u32>,
    callback: Option<ItemCallback>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            style: ButtonStyle::Secondary,
            label: Some(label.into()),
            emoji: None,
            custom_id: generated_custom_id(),
            explicit_id: false,
            url: None,
            sku_id: None,
            disabled: false,
            row: None,
            id: None,
            callback: None,
        }
    }

    /// Button that opens `url`. It never produces an interaction.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            style: ButtonStyle::Link,
            url: Some(url.into()),
            ..Self::new(label)
        }
    }

    /// Purchase button for a SKU.
    pub fn premium(sku_id: Id<SkuMarker>) -> Self {
        Self {
            style: ButtonStyle::Premium,
            label: None,
            sku_id: Some(sku_id),
            ..Self::new("")
        }
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = custom_id.into();
        self.explicit_id = true;
        self
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn emoji(mut self, emoji: impl Into<PartialEmoji>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn row(mut self, row: u8) -> Self {
        self.row = Some(row);
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn on_click<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.callback = Some(item_callback(f));
        self
    }

    pub fn get_style(&self) -> ButtonStyle {
        self.style
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn set_style(&mut self, style: ButtonStyle) {
        self.style = style;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn has_custom_id(&self) -> bool {
        !matches!(self.style, ButtonStyle::Link | ButtonStyle::Premium)
    }

    /// Inert copy of a button found on a message.
    pub(crate) fn from_model(button: &model::Button) -> Self {
        let mut out = Self::new("");
        out.apply(button);
        if let Some(custom_id) = &button.custom_id {
            out.custom_id = custom_id.clone();
            out.explicit_id = true;
        }
        out
    }

    fn apply(&mut self, button: &model::Button) {
        self.style = button.style;
        self.label = button.label.clone();
        self.emoji = button.emoji.clone();
        self.url = button.url.clone();
        self.sku_id = button.sku_id;
        self.disabled = button.disabled;
        self.id = button.id;
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("style", &self.style)
            .field("label", &self.label)
            .field("custom_id", &self.custom_id)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Item for Button {
    fn component_type(&self) -> ComponentType {
        ComponentType::Button
    }

    fn custom_id(&self) -> Option<&str> {
        self.has_custom_id().then_some(self.custom_id.as_str())
    }

    fn numeric_id(&self) -> Option<u32> {
        self.id
    }

    fn row(&self) -> Option<u8> {
        self.row
    }

    fn set_row(&mut self, row: Option<u8>) {
        self.row = row;
    }

    fn is_persistent(&self) -> bool {
        self.explicit_id || !self.has_custom_id()
    }

    fn to_component(&self) -> Component {
        Component::Button(model::Button {
            style: self.style,
            label: self.label.clone(),
            emoji: self.emoji.clone(),
            custom_id: self.custom_id().map(str::to_string),
            url: self.url.clone(),
            sku_id: self.sku_id,
            disabled: self.disabled,
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::Button(button) = component {
            self.apply(button);
        }
    }

    async fn callback(&mut self, ctx: ItemContext) -> Result<()> {
        match &self.callback {
            Some(callback) => callback(ctx).await,
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use async_trait::async_trait;
use std::any::Any;

use super::generated_custom_id;
use super::item::Item;
use crate::types::component::{self as model, Component, ComponentType, TextInputStyle};
use crate::types::interaction::SubmittedComponent;

/// Text field inside a modal.
#[derive(Clone, Debug)]
pub struct TextInput {
    custom_id: String,
    explicit_id: bool,
    label: Option<String>,
    style: TextInputStyle,
    placeholder: Option<String>,
    default: Option<String>,
    required: Option<bool>,
    min_length: Option<u16>,
    max_length: Option<u16>,
    row: Option<u8>,
    id: Option<u32>,
    value: Option<String>,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            custom_id: generated_custom_id(),
            explicit_id: false,
            label: Some(label.into()),
            style: TextInputStyle::Short,
            placeholder: None,
            default: None,
            required: None,
            min_length: None,
            max_length: None,
            row: None,
            id: None,
            value: None,
        }
    }

    /// Input without its own label, for use inside a [`Label`](super::Label).
    pub fn unlabeled() -> Self {
        Self {
            label: None,
            ..Self::new("")
        }
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = custom_id.into();
        self.explicit_id = true;
        self
    }

    pub fn style(mut self, style: TextInputStyle) -> Self {
        self.style = style;
        self
    }

    pub fn paragraph(self) -> Self {
        self.style(TextInputStyle::Paragraph)
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Pre-filled text.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn min_length(mut self, min: u16) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
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

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Submitted text, or the pre-filled text before submission.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().or(self.default.as_deref())
    }

    pub(crate) fn from_model(input: &model::TextInput) -> Self {
        let mut out = Self::unlabeled().custom_id(input.custom_id.clone());
        out.apply(input);
        out
    }

    fn apply(&mut self, input: &model::TextInput) {
        self.label = input.label.clone();
        self.style = input.style;
        self.placeholder = input.placeholder.clone();
        self.default = input.value.clone();
        self.required = input.required;
        self.min_length = input.min_length;
        self.max_length = input.max_length;
        self.id = input.id;
    }
}

#[async_trait]
impl Item for TextInput {
    fn component_type(&self) -> ComponentType {
        ComponentType::TextInput
    }

    fn custom_id(&self) -> Option<&str> {
        Some(&self.custom_id)
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

    fn is_dispatchable(&self) -> bool {
        false
    }

    fn is_persistent(&self) -> bool {
        self.explicit_id
    }

    fn to_component(&self) -> Component {
        Component::TextInput(model::TextInput {
            custom_id: self.custom_id.clone(),
            style: self.style,
            label: self.label.clone(),
            placeholder: self.placeholder.clone(),
            value: self.default.clone(),
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::TextInput(input) = component {
            self.apply(input);
        }
    }

    fn refresh_submitted(&mut self, component: &SubmittedComponent) {
        if let SubmittedComponent::TextInput { value, .. } = component {
            self.value = Some(value.clone());
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

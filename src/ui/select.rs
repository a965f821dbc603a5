use async_trait::async_trait;
use std::any::Any;
use std::future::Future;

use super::generated_custom_id;
use super::item::{item_callback, Item, ItemCallback, ItemContext};
use crate::error::Result;
use crate::types::channel::ChannelType;
use crate::types::component::{
    Component, ComponentType, SelectDefaultValue, SelectMenu, SelectMenuType, SelectOption,
};
use crate::types::interaction::{Interaction, SubmittedComponent};

/// A select menu of any kind.
///
/// After an interaction, [`Select::values`] holds what the user picked:
/// option values for string selects, snowflakes for the others.
pub struct Select {
    kind: SelectMenuType,
    custom_id: String,
    explicit_id: bool,
    options: Vec<SelectOption>,
    channel_types: Option<Vec<ChannelType>>,
    placeholder: Option<String>,
    default_values: Vec<SelectDefaultValue>,
    min_values: Option<u8>,
    max_values: Option<u8>,
    disabled: bool,
    required: Option<bool>,
    row: Option<u8>,
    id: Option<u32>,
    values: Vec<String>,
    callback: Option<ItemCallback>,
}

impl Select {
    pub fn new(kind: SelectMenuType) -> Self {
        Self {
            kind,
            custom_id: generated_custom_id(),
            explicit_id: false,
            options: Vec::new(),
            channel_types: None,
            placeholder: None,
            default_values: Vec::new(),
            min_values: None,
            max_values: None,
            disabled: false,
            required: None,
            row: None,
            id: None,
            values: Vec::new(),
            callback: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SelectMenuType::String)
    }

    pub fn user() -> Self {
        Self::new(SelectMenuType::User)
    }

    pub fn role() -> Self {
        Self::new(SelectMenuType::Role)
    }

    pub fn mentionable() -> Self {
        Self::new(SelectMenuType::Mentionable)
    }

    pub fn channel() -> Self {
        Self::new(SelectMenuType::Channel)
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = custom_id.into();
        self.explicit_id = true;
        self
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn channel_types(mut self, types: Vec<ChannelType>) -> Self {
        self.channel_types = Some(types);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_value(mut self, value: SelectDefaultValue) -> Self {
        self.default_values.push(value);
        self
    }

    pub fn min_values(mut self, min: u8) -> Self {
        self.min_values = Some(min);
        self
    }

    pub fn max_values(mut self, max: u8) -> Self {
        self.max_values = Some(max);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Only used inside modals.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
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

    pub fn on_select<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.callback = Some(item_callback(f));
        self
    }

    pub fn kind(&self) -> SelectMenuType {
        self.kind
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get_options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub(crate) fn from_model(select: &SelectMenu) -> Self {
        let mut out = Self::new(select.kind).custom_id(select.custom_id.clone());
        out.apply(select);
        out
    }

    fn apply(&mut self, select: &SelectMenu) {
        self.kind = select.kind;
        self.options = select.options.clone();
        self.channel_types = select.channel_types.clone();
        self.placeholder = select.placeholder.clone();
        self.default_values = select.default_values.clone();
        self.min_values = select.min_values;
        self.max_values = select.max_values;
        self.disabled = select.disabled;
        self.required = select.required;
        self.id = select.id;
    }
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("kind", &self.kind)
            .field("custom_id", &self.custom_id)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Item for Select {
    fn component_type(&self) -> ComponentType {
        self.kind.component_type()
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

    fn is_persistent(&self) -> bool {
        self.explicit_id
    }

    fn to_component(&self) -> Component {
        Component::SelectMenu(SelectMenu {
            kind: self.kind,
            custom_id: self.custom_id.clone(),
            options: self.options.clone(),
            channel_types: self.channel_types.clone(),
            placeholder: self.placeholder.clone(),
            default_values: self.default_values.clone(),
            min_values: self.min_values,
            max_values: self.max_values,
            disabled: self.disabled,
            required: self.required,
            id: self.id,
        })
    }

    fn refresh_component(&mut self, component: &Component) {
        if let Component::SelectMenu(select) = component {
            self.apply(select);
        }
    }

    fn refresh_state(&mut self, interaction: &Interaction) {
        if let Some(data) = interaction.component_data() {
            self.values = data.values.clone();
        }
    }

    fn refresh_submitted(&mut self, component: &SubmittedComponent) {
        if let SubmittedComponent::Select { values, .. } = component {
            self.values = values.clone();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::interaction::tests::interaction_json;
    use serde_json::json;

    #[test]
    fn renders_options() {
        let select = Select::string()
            .custom_id("flavour")
            .placeholder("Pick one")
            .option(SelectOption::new("Vanilla", "v"))
            .option(SelectOption::new("Chocolate", "c"))
            .max_values(2);
        assert_eq!(select.width(), 5);
        assert_eq!(
            serde_json::to_value(select.to_component()).unwrap(),
            json!({
                "type": 3,
                "custom_id": "flavour",
                "placeholder": "Pick one",
                "options": [
                    {"label": "Vanilla", "value": "v"},
                    {"label": "Chocolate", "value": "c"}
                ],
                "max_values": 2
            })
        );
    }

    #[test]
    fn values_come_from_the_interaction() {
        let mut select = Select::user().custom_id("who");
        let interaction: Interaction = serde_json::from_value(interaction_json(
            3,
            json!({"custom_id": "who", "component_type": 5, "values": ["1", "2"]}),
        ))
        .unwrap();
        select.refresh_state(&interaction);
        assert_eq!(select.values(), ["1", "2"]);
        assert_eq!(select.component_type(), ComponentType::UserSelect);
    }
}

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::item::{downcast, find_slot, has_custom_id, needs_row, walk_items, Item, ItemContext};
use super::select::Select;
use super::text_input::TextInput;
use super::{check_custom_id, generated_custom_id, InteractionCheck, TimeoutHook, UiError};
use crate::error::Result;
use crate::types::component::{action_row, ComponentType};
use crate::types::interaction::{ModalSubmitData, SubmittedComponent};
use crate::types::response::InteractionResponse;

const MAX_TITLE_LEN: usize = 45;
const MAX_TOP_LEVEL: usize = 5;

/// Called with the submitted values once the user sends the modal.
pub type SubmitCallback =
    Arc<dyn Fn(ItemContext, ModalValues) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Values of a submitted modal, keyed by custom id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalValues {
    text: HashMap<String, String>,
    selected: HashMap<String, Vec<String>>,
}

impl ModalValues {
    pub fn from_submission(data: &ModalSubmitData) -> Self {
        let mut values = Self::default();
        for leaf in data.leaves() {
            match leaf {
                SubmittedComponent::TextInput {
                    custom_id, value, ..
                } => {
                    values.text.insert(custom_id.clone(), value.clone());
                }
                SubmittedComponent::Select {
                    custom_id,
                    values: selected,
                    ..
                } => {
                    values.selected.insert(custom_id.clone(), selected.clone());
                }
                _ => {}
            }
        }
        values
    }

    /// Text entered into an input.
    pub fn text(&self, custom_id: &str) -> Option<&str> {
        self.text.get(custom_id).map(String::as_str)
    }

    /// Values picked in a select.
    pub fn selected(&self, custom_id: &str) -> &[String] {
        self.selected.get(custom_id).map_or(&[][..], Vec::as_slice)
    }
}

/// A popup form.
///
/// Modals hold text inputs, selects, labels and text displays. Once sent,
/// the [`ViewStore`](super::ViewStore) keeps it per user until it is
/// submitted or times out.
pub struct Modal {
    title: String,
    custom_id: String,
    items: Vec<Box<dyn Item>>,
    timeout: Option<Duration>,
    last_interaction: Instant,
    on_submit: Option<SubmitCallback>,
    check: Option<InteractionCheck>,
    on_timeout: Option<TimeoutHook>,
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("title", &self.title)
            .field("custom_id", &self.custom_id)
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl Modal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            custom_id: generated_custom_id(),
            items: Vec::new(),
            timeout: None,
            last_interaction: Instant::now(),
            on_submit: None,
            check: None,
            on_timeout: None,
        }
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = custom_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn item(mut self, item: impl Item) -> Result<Self, UiError> {
        self.add_item(item)?;
        Ok(self)
    }

    pub fn on_submit<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemContext, ModalValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_submit = Some(Arc::new(move |ctx, values| f(ctx, values).boxed()));
        self
    }

    pub fn with_check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.check = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn on_timeout<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_timeout = Some(Arc::new(move || f().boxed()));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn get_custom_id(&self) -> &str {
        &self.custom_id
    }

    pub fn children(&self) -> &[Box<dyn Item>] {
        &self.items
    }

    pub(crate) fn check(&self) -> Option<InteractionCheck> {
        self.check.clone()
    }

    pub(crate) fn submit_callback(&self) -> Option<SubmitCallback> {
        self.on_submit.clone()
    }

    pub(crate) fn timeout_hook(&self) -> Option<TimeoutHook> {
        self.on_timeout.clone()
    }

    pub fn add_item(&mut self, item: impl Item) -> Result<(), UiError> {
        let kind = item.component_type();
        let allowed = kind == ComponentType::TextInput
            || kind.is_select()
            || kind == ComponentType::Label
            || kind == ComponentType::TextDisplay;
        if !allowed {
            return Err(UiError::UnsupportedItem(kind_name(kind)));
        }
        if self.items.len() >= MAX_TOP_LEVEL {
            return Err(UiError::TooManyComponents {
                count: self.items.len() + 1,
                max: MAX_TOP_LEVEL,
            });
        }
        let item: Box<dyn Item> = Box::new(item);
        for nested in walk_items(std::slice::from_ref(&item)) {
            if let Some(custom_id) = nested.custom_id() {
                check_custom_id(custom_id)?;
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Build the `Modal` callback body.
    pub fn to_response(&self) -> Result<InteractionResponse, UiError> {
        let title_len = self.title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_LEN {
            return Err(UiError::InvalidModal(format!(
                "title must be 1 to {MAX_TITLE_LEN} characters, got {title_len}"
            )));
        }
        if self.items.is_empty() {
            return Err(UiError::InvalidModal("a modal needs at least one item".into()));
        }
        check_custom_id(&self.custom_id)?;
        let components = self
            .items
            .iter()
            .map(|item| {
                let component = item.to_component();
                if needs_row(item.component_type()) {
                    action_row(vec![component])
                } else {
                    component
                }
            })
            .collect();
        Ok(InteractionResponse::modal(
            self.custom_id.clone(),
            self.title.clone(),
            components,
        ))
    }

    /// Copy submitted values into the matching items.
    pub fn refresh(&mut self, data: &ModalSubmitData) {
        for leaf in data.leaves() {
            let Some(custom_id) = leaf.custom_id() else {
                continue;
            };
            let predicate = has_custom_id(custom_id);
            match find_slot(self.items.iter_mut().collect(), &predicate) {
                Some(slot) => slot.refresh_submitted(leaf),
                None => debug!(
                    modal = %self.custom_id,
                    custom_id,
                    "submitted component has no matching item"
                ),
            }
        }
    }

    /// Current text of an input, nested ones included.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.find(custom_id)
            .and_then(downcast::<TextInput>)
            .and_then(TextInput::value)
    }

    /// Current values of a select.
    pub fn values(&self, custom_id: &str) -> &[String] {
        self.find(custom_id)
            .and_then(downcast::<Select>)
            .map_or(&[][..], Select::values)
    }

    fn find(&self, custom_id: &str) -> Option<&dyn Item> {
        walk_items(&self.items)
            .into_iter()
            .find(|item| item.custom_id() == Some(custom_id))
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.timeout
            .is_some_and(|timeout| now.saturating_duration_since(self.last_interaction) >= timeout)
    }

    pub(crate) fn touch(&mut self) {
        self.last_interaction = Instant::now();
    }
}

fn kind_name(kind: ComponentType) -> &'static str {
    match kind {
        ComponentType::Button => "a button",
        ComponentType::ActionRow => "an action row",
        ComponentType::Section => "a section",
        ComponentType::Container => "a container",
        ComponentType::Separator => "a separator",
        ComponentType::Thumbnail => "a thumbnail",
        _ => "this component",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::component::SelectOption;
    use crate::ui::{Button, Label, TextDisplay};
    use serde_json::json;

    fn feedback() -> Modal {
        Modal::new("Feedback")
            .custom_id("feedback")
            .item(TextInput::new("Name").custom_id("name"))
            .unwrap()
            .item(
                Label::new(
                    "Rating",
                    Select::string()
                        .custom_id("rating")
                        .options([SelectOption::new("Good", "good"), SelectOption::new("Bad", "bad")]),
                )
                .description("How did we do?"),
            )
            .unwrap()
            .item(TextDisplay::new("Thanks!"))
            .unwrap()
    }

    #[test]
    fn response_wraps_bare_inputs() {
        let response = serde_json::to_value(feedback().to_response().unwrap()).unwrap();
        assert_eq!(response["type"], 9);
        let components = &response["data"]["components"];
        assert_eq!(components[0]["type"], 1);
        assert_eq!(components[0]["components"][0]["custom_id"], "name");
        assert_eq!(components[1]["type"], 18);
        assert_eq!(components[1]["component"]["custom_id"], "rating");
        assert_eq!(components[2]["type"], 10);
    }

    #[test]
    fn rejects_bad_modals() {
        assert!(matches!(
            Modal::new("").item(TextInput::new("x")).unwrap().to_response(),
            Err(UiError::InvalidModal(_))
        ));
        assert!(matches!(
            Modal::new("x".repeat(46)).item(TextInput::new("x")).unwrap().to_response(),
            Err(UiError::InvalidModal(_))
        ));
        assert_eq!(
            Modal::new("t").item(Button::new("b")).unwrap_err(),
            UiError::UnsupportedItem("a button")
        );

        let mut modal = Modal::new("t");
        for i in 0..5 {
            modal.add_item(TextInput::new(format!("f{i}"))).unwrap();
        }
        assert_eq!(
            modal.add_item(TextInput::new("sixth")).unwrap_err(),
            UiError::TooManyComponents { count: 6, max: 5 }
        );
    }

    #[test]
    fn refresh_reads_nested_submission() {
        let data: ModalSubmitData = serde_json::from_value(json!({
            "custom_id": "feedback",
            "components": [
                {"type": 1, "components": [
                    {"type": 4, "custom_id": "name", "value": "Ferris"}
                ]},
                {"type": 18, "id": 3, "component": {
                    "type": 3, "custom_id": "rating", "values": ["good"]
                }},
                {"type": 10, "id": 5},
                {"type": 1, "components": [
                    {"type": 4, "custom_id": "stale", "value": "ignored"}
                ]}
            ]
        }))
        .unwrap();

        let mut modal = feedback();
        modal.refresh(&data);
        assert_eq!(modal.value("name"), Some("Ferris"));
        assert_eq!(modal.values("rating"), ["good"]);

        let values = ModalValues::from_submission(&data);
        assert_eq!(values.text("stale"), Some("ignored"));
        assert_eq!(values.selected("rating"), ["good"]);
        assert!(values.selected("missing").is_empty());
    }
}

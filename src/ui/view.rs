use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::item::{downcast, downcast_mut, find_slot, has_custom_id, needs_row, walk_items, Item, ItemContext};
use super::layout::{item_from_component, ActionRow};
use super::{check_custom_id, InteractionCheck, TimeoutHook, UiError};
use crate::error::Result;
use crate::types::component::{action_row, walk_components, Component, ComponentType};
use crate::types::message::{Message, MessageFlags};
use crate::types::util::random_hex_id;

/// Views time out after three minutes without interaction unless told
/// otherwise.
pub const DEFAULT_VIEW_TIMEOUT: Duration = Duration::from_secs(180);

const MAX_ROWS: u8 = 5;
const ROW_WIDTH: u8 = 5;
const MAX_LEGACY_ITEMS: usize = 25;
const MAX_V2_COMPONENTS: usize = 40;

/// A set of items attached to a message.
///
/// Classic views lay their items out in up to five action rows. As soon as
/// a layout item is added (text display, section, container, separator,
/// thumbnail or an explicit [`ActionRow`]) the view switches to the
/// components v2 layout: items render top to bottom in insertion order and
/// loose buttons and selects are packed into rows.
pub struct View {
    id: String,
    items: Vec<Box<dyn Item>>,
    timeout: Option<Duration>,
    last_interaction: Instant,
    finished: bool,
    check: Option<InteractionCheck>,
    on_timeout: Option<TimeoutHook>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("items", &self.items.len())
            .field("timeout", &self.timeout)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            id: random_hex_id(),
            items: Vec::new(),
            timeout: Some(DEFAULT_VIEW_TIMEOUT),
            last_interaction: Instant::now(),
            finished: false,
            check: None,
            on_timeout: None,
        }
    }

    /// `None` disables the timeout, which persistent views require.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add an item, builder style.
    pub fn item(mut self, item: impl Item) -> Result<Self, UiError> {
        self.add_item(item)?;
        Ok(self)
    }

    /// Check run before any item of this view handles an interaction.
    /// Returning `false` drops the interaction.
    pub fn with_check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.check = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    /// Hook run when the store drops this view after its timeout.
    pub fn on_timeout<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_timeout = Some(Arc::new(move || f().boxed()));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn check(&self) -> Option<InteractionCheck> {
        self.check.clone()
    }

    pub(crate) fn timeout_hook(&self) -> Option<TimeoutHook> {
        self.on_timeout.clone()
    }

    /// Add an item. The view is left untouched if the item doesn't fit.
    pub fn add_item(&mut self, item: impl Item) -> Result<(), UiError> {
        self.add_boxed(Box::new(item))
    }

    pub(crate) fn add_boxed(&mut self, item: Box<dyn Item>) -> Result<(), UiError> {
        self.items.push(item);
        if let Err(err) = self.validate() {
            self.items.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Remove the top-level item with this custom id.
    pub fn remove_item(&mut self, custom_id: &str) -> Option<Box<dyn Item>> {
        let index = self
            .items
            .iter()
            .position(|item| item.custom_id() == Some(custom_id))?;
        Some(self.items.remove(index))
    }

    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    /// Top-level items in insertion order.
    pub fn children(&self) -> &[Box<dyn Item>] {
        &self.items
    }

    /// Every item, nested ones included, depth first.
    pub fn walk(&self) -> Vec<&dyn Item> {
        walk_items(&self.items)
    }

    pub fn find_item(&self, custom_id: &str) -> Option<&dyn Item> {
        self.walk()
            .into_iter()
            .find(|item| item.custom_id() == Some(custom_id))
    }

    pub fn find_item_mut(&mut self, custom_id: &str) -> Option<&mut (dyn Item + 'static)> {
        self.slot_mut(custom_id).map(|slot| &mut **slot)
    }

    pub(crate) fn slot_mut(&mut self, custom_id: &str) -> Option<&mut Box<dyn Item>> {
        let predicate = has_custom_id(custom_id);
        find_slot(self.items.iter_mut().collect(), &predicate)
    }

    /// Typed access to an item, e.g. `view.get_item::<Button>("confirm")`.
    pub fn get_item<T: Item>(&self, custom_id: &str) -> Option<&T> {
        self.find_item(custom_id).and_then(downcast::<T>)
    }

    pub fn get_item_mut<T: Item>(&mut self, custom_id: &str) -> Option<&mut T> {
        self.find_item_mut(custom_id).and_then(downcast_mut::<T>)
    }

    /// Whether this view renders with the components v2 layout.
    pub fn is_components_v2(&self) -> bool {
        self.items.iter().any(|item| {
            let kind = item.component_type();
            kind.is_v2() || kind == ComponentType::ActionRow
        })
    }

    /// Flags the message carrying this view needs.
    pub fn message_flags(&self) -> MessageFlags {
        if self.is_components_v2() {
            MessageFlags::IS_COMPONENTS_V2
        } else {
            MessageFlags::empty()
        }
    }

    fn validate(&self) -> Result<(), UiError> {
        for item in self.walk() {
            if let Some(custom_id) = item.custom_id() {
                check_custom_id(custom_id)?;
            }
        }
        if self.is_components_v2() {
            self.v2_components().map(drop)
        } else {
            self.legacy_rows().map(drop)
        }
    }

    /// Place items into rows, honouring explicit row hints.
    fn legacy_rows(&self) -> Result<Vec<Vec<&dyn Item>>, UiError> {
        if self.items.len() > MAX_LEGACY_ITEMS {
            return Err(UiError::TooManyComponents {
                count: self.items.len(),
                max: MAX_LEGACY_ITEMS,
            });
        }
        let mut rows: Vec<Vec<&dyn Item>> = vec![Vec::new(); MAX_ROWS as usize];
        let mut widths = [0u8; MAX_ROWS as usize];
        for item in &self.items {
            let width = item.width();
            let fits = |used: u8| used.checked_add(width).is_some_and(|total| total <= ROW_WIDTH);
            let row = match item.row() {
                Some(row) if row >= MAX_ROWS => return Err(UiError::InvalidRow(row)),
                Some(row) if !fits(widths[row as usize]) => return Err(UiError::RowFull(row)),
                Some(row) => row as usize,
                None => widths
                    .iter()
                    .position(|&used| fits(used))
                    .ok_or(UiError::ViewFull)?,
            };
            widths[row] += width;
            rows[row].push(&**item);
        }
        Ok(rows)
    }

    fn v2_components(&self) -> Result<Vec<Component>, UiError> {
        let mut out = Vec::new();
        let mut pending = Vec::new();
        let mut width = 0u8;
        for (index, item) in self.items.iter().enumerate() {
            let kind = item.component_type();
            if !needs_row(kind) {
                if !pending.is_empty() {
                    out.push(action_row(std::mem::take(&mut pending)));
                    width = 0;
                }
                if let Some(row) = downcast::<ActionRow>(&**item) {
                    if row.used_width() > ROW_WIDTH {
                        return Err(UiError::RowFull(u8::try_from(index).unwrap_or(u8::MAX)));
                    }
                }
                out.push(item.to_component());
                continue;
            }
            let item_width = item.width();
            if width.saturating_add(item_width) > ROW_WIDTH && !pending.is_empty() {
                out.push(action_row(std::mem::take(&mut pending)));
                width = 0;
            }
            pending.push(item.to_component());
            width = width.saturating_add(item_width);
        }
        if !pending.is_empty() {
            out.push(action_row(pending));
        }
        let count: usize = out.iter().map(Component::total_count).sum();
        if count > MAX_V2_COMPONENTS {
            return Err(UiError::TooManyComponents {
                count,
                max: MAX_V2_COMPONENTS,
            });
        }
        Ok(out)
    }

    /// Render the view to message components.
    pub fn to_components(&self) -> Result<Vec<Component>, UiError> {
        if self.is_components_v2() {
            return self.v2_components();
        }
        Ok(self
            .legacy_rows()?
            .into_iter()
            .filter(|row| !row.is_empty())
            .map(|row| action_row(row.into_iter().map(|item| item.to_component()).collect()))
            .collect())
    }

    /// Sync item state from the components of the message the view is
    /// attached to. Items are matched by custom id, then by numeric id.
    pub fn refresh(&mut self, components: &[Component]) {
        for component in walk_components(components) {
            let slot = match component.custom_id() {
                Some(custom_id) => self.slot_mut(custom_id),
                None => match component.numeric_id() {
                    Some(id) => {
                        let predicate = move |item: &dyn Item| item.numeric_id() == Some(id);
                        find_slot(self.items.iter_mut().collect(), &predicate)
                    }
                    None => None,
                },
            };
            if let Some(slot) = slot {
                slot.refresh_component(component);
            }
        }
    }

    /// Rebuild a view from a sent message. The items have no callbacks;
    /// use it to edit a message's components, not to handle interactions.
    pub fn from_message(message: &Message) -> Self {
        let mut view = Self::new();
        if message.flags.contains(MessageFlags::IS_COMPONENTS_V2) {
            view.items = message.components.iter().map(item_from_component).collect();
            return view;
        }
        for (index, component) in message.components.iter().enumerate() {
            let row = u8::try_from(index).ok();
            match component {
                Component::ActionRow(action_row) => {
                    for child in &action_row.components {
                        let mut item = item_from_component(child);
                        item.set_row(row);
                        view.items.push(item);
                    }
                }
                other => view.items.push(item_from_component(other)),
            }
        }
        view
    }

    /// No timeout, and every interactive item has an explicit custom id.
    pub fn is_persistent(&self) -> bool {
        self.timeout.is_none()
            && self
                .walk()
                .into_iter()
                .filter(|item| item.is_dispatchable())
                .all(|item| item.is_persistent())
    }

    pub fn stop(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.timeout
            .is_some_and(|timeout| now.saturating_duration_since(self.last_interaction) >= timeout)
    }

    /// Reset the timeout.
    pub fn touch(&mut self) {
        self.last_interaction = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{Button, Container, Section, Select, TextDisplay};
    use crate::types::component::SelectOption;
    use serde_json::json;

    fn buttons(view: &mut View, count: usize) {
        for i in 0..count {
            view.add_item(Button::new(format!("b{i}")).custom_id(format!("b{i}")))
                .unwrap();
        }
    }

    fn row_sizes(components: &[Component]) -> Vec<usize> {
        components.iter().map(|row| row.children().len()).collect()
    }

    #[test]
    fn buttons_fill_rows_in_order() {
        let mut view = View::new();
        buttons(&mut view, 7);
        let components = view.to_components().unwrap();
        assert_eq!(row_sizes(&components), vec![5, 2]);
        assert!(view.message_flags().is_empty());
    }

    #[test]
    fn select_takes_a_whole_row() {
        let mut view = View::new();
        view.add_item(Button::new("a").custom_id("a")).unwrap();
        view.add_item(Select::string().custom_id("s").option(SelectOption::new("x", "x")))
            .unwrap();
        view.add_item(Button::new("b").custom_id("b")).unwrap();
        let components = view.to_components().unwrap();
        assert_eq!(row_sizes(&components), vec![2, 1]);
        assert_eq!(components[1].children()[0].kind(), ComponentType::StringSelect);
    }

    #[test]
    fn explicit_rows() {
        let mut view = View::new();
        view.add_item(Button::new("late").custom_id("late").row(2)).unwrap();
        view.add_item(Button::new("early").custom_id("early")).unwrap();
        let components = view.to_components().unwrap();
        assert_eq!(components[0].children()[0].custom_id(), Some("early"));
        assert_eq!(components[1].children()[0].custom_id(), Some("late"));

        let err = view.add_item(Button::new("x").row(5)).unwrap_err();
        assert_eq!(err, UiError::InvalidRow(5));

        view.add_item(Select::string().custom_id("wide").row(3)).unwrap();
        let err = view.add_item(Button::new("y").row(3)).unwrap_err();
        assert_eq!(err, UiError::RowFull(3));
        assert_eq!(view.children().len(), 3);
    }

    /// Item claiming more than a row's worth of width.
    struct Oversized(Option<u8>);

    #[async_trait::async_trait]
    impl Item for Oversized {
        fn component_type(&self) -> ComponentType {
            ComponentType::Button
        }

        fn width(&self) -> u8 {
            u8::MAX
        }

        fn row(&self) -> Option<u8> {
            self.0
        }

        fn to_component(&self) -> Component {
            Button::new("wide").to_component()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn oversized_item_width_does_not_overflow() {
        let mut view = View::new();
        view.add_item(Button::new("a").custom_id("a").row(0)).unwrap();
        assert_eq!(
            view.add_item(Oversized(Some(0))).unwrap_err(),
            UiError::RowFull(0)
        );
        assert_eq!(view.add_item(Oversized(None)).unwrap_err(), UiError::ViewFull);
        assert_eq!(view.children().len(), 1);
    }

    #[test]
    fn full_view_is_rejected() {
        let mut view = View::new();
        buttons(&mut view, 25);
        let err = view.add_item(Button::new("extra")).unwrap_err();
        assert_eq!(
            err,
            UiError::TooManyComponents {
                count: 26,
                max: 25
            }
        );

        let mut selects = View::new();
        for i in 0..5 {
            selects.add_item(Select::string().custom_id(format!("s{i}"))).unwrap();
        }
        assert_eq!(
            selects.add_item(Button::new("no room")).unwrap_err(),
            UiError::ViewFull
        );
    }

    #[test]
    fn custom_id_length_is_checked() {
        let mut view = View::new();
        let err = view
            .add_item(Button::new("long").custom_id("x".repeat(101)))
            .unwrap_err();
        assert_eq!(err, UiError::CustomIdTooLong(101));
        assert!(view.children().is_empty());
    }

    #[test]
    fn v2_layout_packs_loose_buttons() {
        let mut view = View::new();
        view.add_item(TextDisplay::new("Pick a colour")).unwrap();
        view.add_item(Button::new("Red").custom_id("red")).unwrap();
        view.add_item(Button::new("Blue").custom_id("blue")).unwrap();
        view.add_item(
            Container::new()
                .accent_color(0xff0000)
                .item(Section::new(Button::new("?").custom_id("help")).text("Need help?")),
        )
        .unwrap();

        assert_eq!(view.message_flags(), MessageFlags::IS_COMPONENTS_V2);
        let components = view.to_components().unwrap();
        let kinds: Vec<_> = components.iter().map(Component::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ComponentType::TextDisplay,
                ComponentType::ActionRow,
                ComponentType::Container
            ]
        );
        assert_eq!(components[1].children().len(), 2);
        assert!(view.find_item("help").is_some());
        assert!(view.get_item::<Button>("help").is_some());
    }

    #[test]
    fn v2_component_limit() {
        let mut view = View::new();
        for i in 0..40 {
            view.add_item(TextDisplay::new(format!("line {i}"))).unwrap();
        }
        assert_eq!(
            view.add_item(TextDisplay::new("one more")).unwrap_err(),
            UiError::TooManyComponents {
                count: 41,
                max: 40
            }
        );
    }

    #[test]
    fn persistence_and_expiry() {
        let view = View::new().item(Button::new("a").custom_id("a")).unwrap();
        assert!(!view.is_persistent());

        let view = view.with_timeout(None);
        assert!(view.is_persistent());
        assert!(!view.is_expired_at(Instant::now() + Duration::from_secs(3600)));

        let anonymous = View::new()
            .with_timeout(None)
            .item(Button::new("anon"))
            .unwrap();
        assert!(!anonymous.is_persistent());

        let timed = View::new().with_timeout(Some(Duration::from_secs(10)));
        assert!(!timed.is_expired_at(Instant::now()));
        assert!(timed.is_expired_at(Instant::now() + Duration::from_secs(11)));
    }

    #[test]
    fn refresh_and_from_message() {
        let message: Message = serde_json::from_value(json!({
            "id": "10",
            "channel_id": "20",
            "author": crate::types::interaction::tests::user_json("30"),
            "content": "",
            "components": [
                {"type": 1, "components": [
                    {"type": 2, "style": 1, "label": "One", "custom_id": "one"}
                ]},
                {"type": 1, "components": [
                    {"type": 2, "style": 4, "label": "Two", "custom_id": "two", "disabled": true}
                ]}
            ]
        }))
        .unwrap();

        let rebuilt = View::from_message(&message);
        assert_eq!(rebuilt.to_components().unwrap(), message.components);

        let mut view = View::new()
            .item(Button::new("Two").custom_id("two"))
            .unwrap();
        view.refresh(&message.components);
        assert!(view.get_item::<Button>("two").unwrap().is_disabled());
    }
}

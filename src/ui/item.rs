use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Modal, ViewStore};
use crate::error::Result;
use crate::http::HttpClient;
use crate::responder::InteractionResponder;
use crate::types::component::{Component, ComponentType};
use crate::types::interaction::{Interaction, SubmittedComponent};

/// Closure callback accepted by the built-in items.
pub type ItemCallback = Arc<dyn Fn(ItemContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

pub(crate) fn item_callback<F, Fut>(f: F) -> ItemCallback
where
    F: Fn(ItemContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

/// Signals an item callback sends back to the dispatcher.
#[derive(Debug, Default)]
pub(crate) struct Signals {
    refresh: AtomicBool,
    stop: AtomicBool,
    keep_modal: AtomicBool,
}

impl Signals {
    pub(crate) fn refresh_requested(&self) -> bool {
        self.refresh.load(Ordering::Acquire)
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub(crate) fn keep_modal_requested(&self) -> bool {
        self.keep_modal.load(Ordering::Acquire)
    }
}

/// Everything an item callback gets to work with.
#[derive(Clone)]
pub struct ItemContext {
    pub interaction: Arc<Interaction>,
    pub responder: InteractionResponder,
    /// Custom id that was matched.
    pub custom_id: String,
    pub store: ViewStore,
    signals: Arc<Signals>,
}

impl ItemContext {
    pub(crate) fn new(
        interaction: Arc<Interaction>,
        responder: InteractionResponder,
        custom_id: String,
        store: ViewStore,
    ) -> Self {
        Self {
            interaction,
            responder,
            custom_id,
            store,
            signals: Arc::new(Signals::default()),
        }
    }

    pub(crate) fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn http(&self) -> &HttpClient {
        self.responder.http()
    }

    /// Selected values of a select interaction.
    pub fn values(&self) -> &[String] {
        self.interaction
            .component_data()
            .map_or(&[][..], |data| data.values.as_slice())
    }

    /// Answer with the re-rendered view once the callback returns, unless
    /// the callback responded itself.
    pub fn refresh_view(&self) {
        self.signals.refresh.store(true, Ordering::Release);
    }

    /// Stop the view and drop it from the store.
    pub fn stop_view(&self) {
        self.signals.stop.store(true, Ordering::Release);
    }

    /// Keep a submitted modal registered for another submission.
    pub fn keep_modal(&self) {
        self.signals.keep_modal.store(true, Ordering::Release);
    }

    /// Open `modal` and track it for this user.
    pub async fn send_modal(&self, modal: Modal) -> Result<()> {
        self.responder.send_modal(&modal).await?;
        if let Some(user) = self.interaction.author_id() {
            self.store.add_modal(user, modal).await;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ItemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemContext")
            .field("interaction_id", &self.interaction.id)
            .field("custom_id", &self.custom_id)
            .finish()
    }
}

/// A component inside a [`View`](super::View) or [`Modal`].
///
/// Implement this for custom stateful items; the built-in items cover the
/// common cases with closure callbacks.
#[async_trait]
pub trait Item: Send + Sync + 'static {
    fn component_type(&self) -> ComponentType;

    fn custom_id(&self) -> Option<&str> {
        None
    }

    /// The optional numeric component `id`.
    fn numeric_id(&self) -> Option<u32> {
        None
    }

    /// Share of an action row (out of 5) the item takes.
    fn width(&self) -> u8 {
        match self.component_type() {
            ComponentType::Button => 1,
            _ => 5,
        }
    }

    /// Requested row (0..=4) in the classic layout.
    fn row(&self) -> Option<u8> {
        None
    }

    fn set_row(&mut self, _row: Option<u8>) {}

    /// Whether interactions can be routed to this item.
    fn is_dispatchable(&self) -> bool {
        self.custom_id().is_some()
    }

    /// Whether the custom id was set explicitly and survives restarts.
    fn is_persistent(&self) -> bool {
        true
    }

    fn to_component(&self) -> Component;

    /// Sync state from a component seen on a message.
    fn refresh_component(&mut self, _component: &Component) {}

    /// Sync state from an incoming component interaction.
    fn refresh_state(&mut self, _interaction: &Interaction) {}

    /// Sync state from a submitted modal leaf.
    fn refresh_submitted(&mut self, _component: &SubmittedComponent) {}

    /// Nested items, for layout items.
    fn children(&self) -> Vec<&Box<dyn Item>> {
        Vec::new()
    }

    fn children_mut(&mut self) -> Vec<&mut Box<dyn Item>> {
        Vec::new()
    }

    async fn interaction_check(&self, _ctx: &ItemContext) -> Result<bool> {
        Ok(true)
    }

    async fn callback(&mut self, _ctx: ItemContext) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Every item in `items`, depth first.
pub(crate) fn walk_items(items: &[Box<dyn Item>]) -> Vec<&dyn Item> {
    let mut out = Vec::new();
    let mut stack: Vec<&Box<dyn Item>> = items.iter().rev().collect();
    while let Some(item) = stack.pop() {
        out.push(&**item);
        stack.extend(item.children().into_iter().rev());
    }
    out
}

/// Slot of the first item matching `predicate`, searching nested items.
pub(crate) fn find_slot<'a>(
    slots: Vec<&'a mut Box<dyn Item>>,
    predicate: &dyn Fn(&dyn Item) -> bool,
) -> Option<&'a mut Box<dyn Item>> {
    for slot in slots {
        if predicate(&**slot) {
            return Some(slot);
        }
        if let Some(found) = find_slot(slot.children_mut(), predicate) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn has_custom_id<'a>(custom_id: &'a str) -> impl Fn(&dyn Item) -> bool + 'a {
    move |item| item.custom_id() == Some(custom_id)
}

/// Clickable or selectable items wrapped into action rows when they sit
/// at the top level.
pub(crate) fn needs_row(kind: ComponentType) -> bool {
    kind == ComponentType::Button || kind.is_select() || kind == ComponentType::TextInput
}

pub(crate) fn downcast<T: Item>(item: &dyn Item) -> Option<&T> {
    item.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<'a, T: Item>(item: &'a mut (dyn Item + 'static)) -> Option<&'a mut T> {
    item.as_any_mut().downcast_mut::<T>()
}

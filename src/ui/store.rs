use async_lock::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, trace, warn};

use super::dynamic::{DynamicFactory, DynamicItem};
use super::item::{Item, ItemContext};
use super::modal::{Modal, ModalValues};
use super::view::View;
use super::{TimeoutHook, UiError};
use crate::error::Result;
use crate::responder::InteractionResponder;
use crate::types::component::{Component, ComponentType};
use crate::types::id::{
    marker::{MessageMarker, UserMarker},
    Id,
};
use crate::types::interaction::Interaction;
use crate::types::message::CreateMessage;

/// A view shared between the store and whoever added it.
pub type SharedView = Arc<Mutex<View>>;

type SharedModal = Arc<Mutex<Modal>>;

/// What happened to a routed interaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    /// An item or modal callback ran.
    Handled,
    /// A view, modal or item check rejected the interaction.
    CheckFailed,
    /// Nothing is tracked for this custom id.
    Unhandled,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct ItemKey {
    kind: ComponentType,
    message_id: Option<Id<MessageMarker>>,
    custom_id: String,
}

struct TrackedView {
    view: SharedView,
    message_id: Option<Id<MessageMarker>>,
    keys: Vec<ItemKey>,
}

#[derive(Default)]
struct StoreInner {
    views: HashMap<String, TrackedView>,
    items: HashMap<ItemKey, String>,
    messages: HashMap<Id<MessageMarker>, String>,
    modals: HashMap<(Id<UserMarker>, String), SharedModal>,
    dynamic: Vec<DynamicFactory>,
}

impl StoreInner {
    fn keys_for(view: &View, message_id: Option<Id<MessageMarker>>) -> Vec<ItemKey> {
        view.walk()
            .into_iter()
            .filter(|item| item.is_dispatchable())
            .filter_map(|item| {
                Some(ItemKey {
                    kind: item.component_type(),
                    message_id,
                    custom_id: item.custom_id()?.to_string(),
                })
            })
            .collect()
    }

    fn index(&mut self, view_id: &str, keys: Vec<ItemKey>) {
        let Some(tracked) = self.views.get_mut(view_id) else {
            return;
        };
        for key in tracked.keys.drain(..) {
            if self.items.get(&key).map(String::as_str) == Some(view_id) {
                self.items.remove(&key);
            }
        }
        for key in &keys {
            self.items.insert(key.clone(), view_id.to_string());
        }
        tracked.keys = keys;
    }

    fn remove(&mut self, view_id: &str) -> Option<TrackedView> {
        let tracked = self.views.remove(view_id)?;
        for key in &tracked.keys {
            if self.items.get(key).map(String::as_str) == Some(view_id) {
                self.items.remove(key);
            }
        }
        if let Some(message_id) = tracked.message_id {
            if self.messages.get(&message_id).map(String::as_str) == Some(view_id) {
                self.messages.remove(&message_id);
            }
        }
        Some(tracked)
    }

    /// Message-bound entries win over unbound ones.
    fn lookup(
        &self,
        kind: ComponentType,
        message_id: Option<Id<MessageMarker>>,
        custom_id: &str,
    ) -> Option<(String, SharedView)> {
        let bound = message_id.map(|message_id| ItemKey {
            kind,
            message_id: Some(message_id),
            custom_id: custom_id.to_string(),
        });
        let unbound = ItemKey {
            kind,
            message_id: None,
            custom_id: custom_id.to_string(),
        };
        let view_id = bound
            .and_then(|key| self.items.get(&key))
            .or_else(|| self.items.get(&unbound))?;
        let tracked = self.views.get(view_id)?;
        Some((view_id.clone(), tracked.view.clone()))
    }

    fn view_for_message(&self, message_id: Id<MessageMarker>) -> Option<(String, SharedView)> {
        let view_id = self.messages.get(&message_id)?;
        let tracked = self.views.get(view_id)?;
        Some((view_id.clone(), tracked.view.clone()))
    }
}

/// Keeps views and modals alive between interactions and routes incoming
/// component and modal interactions to them.
///
/// Cloning is cheap; clones share the same state. Callbacks receive the
/// store through [`ItemContext::store`] and may add or remove views and
/// modals, but must not lock the view they are running in.
#[derive(Clone, Default)]
pub struct ViewStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl std::fmt::Debug for ViewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStore").finish_non_exhaustive()
    }
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a view. Without a message id the view must be persistent and
    /// answers the matching custom ids on any message.
    pub async fn add_view(
        &self,
        view: View,
        message_id: Option<Id<MessageMarker>>,
    ) -> Result<SharedView, UiError> {
        if message_id.is_none() && !view.is_persistent() {
            return Err(UiError::NotPersistent);
        }
        let view_id = view.id().to_string();
        let keys = StoreInner::keys_for(&view, message_id);
        let shared = Arc::new(Mutex::new(view));

        let mut inner = self.inner.lock().await;
        if let Some(message_id) = message_id {
            if let Some(previous) = inner.messages.get(&message_id).cloned() {
                inner.remove(&previous);
            }
            inner.messages.insert(message_id, view_id.clone());
        }
        inner.views.insert(
            view_id.clone(),
            TrackedView {
                view: shared.clone(),
                message_id,
                keys: Vec::new(),
            },
        );
        inner.index(&view_id, keys);
        debug!(%view_id, ?message_id, "tracking view");
        Ok(shared)
    }

    pub async fn remove_view(&self, view_id: &str) -> Option<SharedView> {
        let tracked = self.inner.lock().await.remove(view_id)?;
        debug!(view_id, "stopped tracking view");
        Some(tracked.view)
    }

    /// Forget the view attached to a message, e.g. after it was deleted.
    pub async fn remove_message_tracking(
        &self,
        message_id: Id<MessageMarker>,
    ) -> Option<SharedView> {
        let mut inner = self.inner.lock().await;
        let view_id = inner.messages.get(&message_id).cloned()?;
        inner.remove(&view_id).map(|tracked| tracked.view)
    }

    pub async fn is_message_tracked(&self, message_id: Id<MessageMarker>) -> bool {
        self.inner.lock().await.messages.contains_key(&message_id)
    }

    /// Views tracked without a message.
    pub async fn persistent_views(&self) -> Vec<SharedView> {
        self.inner
            .lock()
            .await
            .views
            .values()
            .filter(|tracked| tracked.message_id.is_none())
            .map(|tracked| tracked.view.clone())
            .collect()
    }

    pub async fn view_count(&self) -> usize {
        self.inner.lock().await.views.len()
    }

    /// Track a modal sent to `user`. A modal with the same custom id
    /// replaces the previous one.
    pub async fn add_modal(&self, user: Id<UserMarker>, modal: Modal) {
        let key = (user, modal.get_custom_id().to_string());
        trace!(user = %user, custom_id = %key.1, "tracking modal");
        self.inner
            .lock()
            .await
            .modals
            .insert(key, Arc::new(Mutex::new(modal)));
    }

    pub async fn remove_modal(&self, user: Id<UserMarker>, custom_id: &str) -> bool {
        self.inner
            .lock()
            .await
            .modals
            .remove(&(user, custom_id.to_string()))
            .is_some()
    }

    pub async fn modal_count(&self) -> usize {
        self.inner.lock().await.modals.len()
    }

    /// Register a [`DynamicItem`] type. Registering it again replaces the
    /// earlier registration.
    pub async fn add_dynamic_items<T: DynamicItem>(&self) -> Result<(), UiError> {
        let factory = DynamicFactory::new::<T>()?;
        let mut inner = self.inner.lock().await;
        inner.dynamic.retain(|f| f.type_id != TypeId::of::<T>());
        debug!(item = factory.type_name, "registered dynamic item");
        inner.dynamic.push(factory);
        Ok(())
    }

    pub async fn remove_dynamic_items<T: DynamicItem>(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let before = inner.dynamic.len();
        inner.dynamic.retain(|f| f.type_id != TypeId::of::<T>());
        inner.dynamic.len() != before
    }

    /// Sync the view attached to `message_id` with the message's current
    /// components.
    pub async fn update_from_message(&self, message_id: Id<MessageMarker>, components: &[Component]) {
        let tracked = self.inner.lock().await.view_for_message(message_id);
        if let Some((_, view)) = tracked {
            view.lock().await.refresh(components);
        }
    }

    /// Drop views and modals whose timeout has elapsed and run their
    /// timeout hooks. Returns how many were dropped.
    pub async fn prune_expired(&self, now: Instant) -> usize {
        let (views, modals) = {
            let inner = self.inner.lock().await;
            let views: Vec<_> = inner
                .views
                .iter()
                .map(|(id, tracked)| (id.clone(), tracked.view.clone()))
                .collect();
            let modals: Vec<_> = inner
                .modals
                .iter()
                .map(|(key, modal)| (key.clone(), modal.clone()))
                .collect();
            (views, modals)
        };

        let mut hooks: Vec<Option<TimeoutHook>> = Vec::new();
        let mut expired_views = Vec::new();
        for (view_id, shared) in views {
            // A locked view is handling an interaction right now.
            let Some(mut view) = shared.try_lock() else {
                continue;
            };
            if view.is_expired_at(now) {
                view.stop();
                hooks.push(view.timeout_hook());
                expired_views.push(view_id);
            }
        }
        let mut expired_modals = Vec::new();
        for (key, shared) in modals {
            let Some(modal) = shared.try_lock() else {
                continue;
            };
            if modal.is_expired_at(now) {
                hooks.push(modal.timeout_hook());
                expired_modals.push(key);
            }
        }

        let count = expired_views.len() + expired_modals.len();
        {
            let mut inner = self.inner.lock().await;
            for view_id in &expired_views {
                inner.remove(view_id);
            }
            for key in &expired_modals {
                inner.modals.remove(key);
            }
        }
        if count > 0 {
            debug!(views = expired_views.len(), modals = expired_modals.len(), "pruned expired ui");
        }
        for hook in hooks.into_iter().flatten() {
            hook().await;
        }
        count
    }

    /// Route a component interaction to its item.
    pub async fn dispatch_view(
        &self,
        interaction: Arc<Interaction>,
        responder: InteractionResponder,
    ) -> Result<DispatchOutcome> {
        let Some(data) = interaction.component_data() else {
            return Ok(DispatchOutcome::Unhandled);
        };
        let kind = data.component_type;
        let custom_id = data.custom_id.clone();
        let message_id = interaction.message_id();

        if let Some(outcome) = self
            .dispatch_dynamic(&interaction, &responder, &custom_id, message_id)
            .await?
        {
            return Ok(outcome);
        }

        let found = self.inner.lock().await.lookup(kind, message_id, &custom_id);
        let Some((view_id, shared)) = found else {
            trace!(%custom_id, "no view for component");
            return Ok(DispatchOutcome::Unhandled);
        };
        let mut view = shared.lock().await;
        if view.is_finished() || view.is_expired_at(Instant::now()) {
            return Ok(DispatchOutcome::Unhandled);
        }
        view.touch();
        match view.slot_mut(&custom_id) {
            Some(item) => item.refresh_state(&interaction),
            None => return Ok(DispatchOutcome::Unhandled),
        }

        let ctx = ItemContext::new(
            interaction.clone(),
            responder.clone(),
            custom_id.clone(),
            self.clone(),
        );
        if let Some(check) = view.check() {
            if !check_passed(check(ctx.clone()).await, &custom_id) {
                return Ok(DispatchOutcome::CheckFailed);
            }
        }
        let Some(item) = view.slot_mut(&custom_id) else {
            return Ok(DispatchOutcome::Unhandled);
        };
        if !check_passed(item.interaction_check(&ctx).await, &custom_id) {
            return Ok(DispatchOutcome::CheckFailed);
        }
        if let Err(err) = item.callback(ctx.clone()).await {
            error!(%view_id, %custom_id, error = %err, "view item callback failed");
            return Err(err);
        }
        self.settle(&view_id, &mut view, &ctx).await?;
        Ok(DispatchOutcome::Handled)
    }

    async fn dispatch_dynamic(
        &self,
        interaction: &Arc<Interaction>,
        responder: &InteractionResponder,
        custom_id: &str,
        message_id: Option<Id<MessageMarker>>,
    ) -> Result<Option<DispatchOutcome>> {
        let (built, tracked) = {
            let inner = self.inner.lock().await;
            let built = inner.dynamic.iter().find_map(|factory| {
                let captures = factory.matches(custom_id)?;
                trace!(item = factory.type_name, custom_id, "dynamic item matched");
                Some(factory.build(interaction, &captures))
            });
            let tracked = message_id.and_then(|id| inner.view_for_message(id));
            (built, tracked)
        };
        let Some(built) = built else {
            return Ok(None);
        };
        let mut item = built?;
        item.refresh_state(interaction);

        let ctx = ItemContext::new(
            interaction.clone(),
            responder.clone(),
            custom_id.to_string(),
            self.clone(),
        );
        if !check_passed(item.interaction_check(&ctx).await, custom_id) {
            return Ok(Some(DispatchOutcome::CheckFailed));
        }
        if let Some((_, shared)) = &tracked {
            shared.lock().await.touch();
        }
        if let Err(err) = item.callback(ctx.clone()).await {
            error!(custom_id, error = %err, "dynamic item callback failed");
            return Err(err);
        }

        match tracked {
            Some((view_id, shared)) => {
                let mut view = shared.lock().await;
                if let Some(slot) = view.slot_mut(custom_id) {
                    *slot = item;
                }
                self.settle(&view_id, &mut view, &ctx).await?;
            }
            None => {
                if ctx.signals().refresh_requested() && !responder.is_done() {
                    if let Some(message) = &interaction.message {
                        let mut view = View::from_message(message);
                        if let Some(slot) = view.slot_mut(custom_id) {
                            *slot = item;
                        }
                        respond_with_view(responder, &view).await?;
                    }
                }
            }
        }
        Ok(Some(DispatchOutcome::Handled))
    }

    /// Apply the signals an item callback raised.
    async fn settle(&self, view_id: &str, view: &mut View, ctx: &ItemContext) -> Result<()> {
        if ctx.signals().stop_requested() {
            view.stop();
        }
        if ctx.signals().refresh_requested() && !ctx.responder.is_done() {
            respond_with_view(&ctx.responder, view).await?;
        }
        let mut inner = self.inner.lock().await;
        if view.is_finished() {
            inner.remove(view_id);
            debug!(view_id, "view stopped");
        } else if let Some(tracked) = inner.views.get(view_id) {
            let keys = StoreInner::keys_for(view, tracked.message_id);
            inner.index(view_id, keys);
        }
        Ok(())
    }

    /// Route a modal submission to the modal the user was sent.
    pub async fn dispatch_modal(
        &self,
        interaction: Arc<Interaction>,
        responder: InteractionResponder,
    ) -> Result<DispatchOutcome> {
        let (Some(data), Some(user)) = (interaction.modal_data(), interaction.author_id()) else {
            return Ok(DispatchOutcome::Unhandled);
        };
        let key = (user, data.custom_id.clone());
        let found = self.inner.lock().await.modals.get(&key).cloned();
        let Some(shared) = found else {
            trace!(custom_id = %key.1, "no modal for submission");
            return Ok(DispatchOutcome::Unhandled);
        };

        let mut modal = shared.lock().await;
        if modal.is_expired_at(Instant::now()) {
            drop(modal);
            self.forget_modal(&key, &shared).await;
            return Ok(DispatchOutcome::Unhandled);
        }
        modal.refresh(data);

        let ctx = ItemContext::new(
            interaction.clone(),
            responder,
            data.custom_id.clone(),
            self.clone(),
        );
        if let Some(check) = modal.check() {
            if !check_passed(check(ctx.clone()).await, &key.1) {
                return Ok(DispatchOutcome::CheckFailed);
            }
        }
        let result = match modal.submit_callback() {
            Some(on_submit) => on_submit(ctx.clone(), ModalValues::from_submission(data)).await,
            None => Ok(()),
        };
        modal.touch();
        drop(modal);

        if let Err(err) = result {
            error!(custom_id = %key.1, error = %err, "modal submit callback failed");
            self.forget_modal(&key, &shared).await;
            return Err(err);
        }
        if !ctx.signals().keep_modal_requested() {
            self.forget_modal(&key, &shared).await;
        }
        Ok(DispatchOutcome::Handled)
    }

    /// Remove `key` only if it still points at `modal`; a callback may have
    /// registered a replacement.
    async fn forget_modal(&self, key: &(Id<UserMarker>, String), modal: &SharedModal) {
        let mut inner = self.inner.lock().await;
        if inner
            .modals
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, modal))
        {
            inner.modals.remove(key);
        }
    }
}

/// A check that errors rejects the interaction like one returning `false`.
fn check_passed(result: Result<bool>, custom_id: &str) -> bool {
    result.unwrap_or_else(|err| {
        warn!(custom_id, error = %err, "interaction check failed");
        false
    })
}

async fn respond_with_view(responder: &InteractionResponder, view: &View) -> Result<()> {
    let message = CreateMessage::new()
        .components(view.to_components()?)
        .flags(view.message_flags());
    responder.edit_message(message).await
}

//! Interactive message UI: views of items, modals, and items rebuilt from
//! their custom id alone.
//!
//! A [`View`] owns a tree of [`Item`]s and renders them to message
//! components. The [`ViewStore`] keeps views alive between interactions and
//! routes each component or modal interaction to the item it belongs to.

mod button;
mod dynamic;
mod item;
mod layout;
mod modal;
mod select;
mod store;
mod text_input;
mod view;

pub use self::button::Button;
pub use self::dynamic::{DynamicItem, TemplateMatch};
pub use self::item::{ItemCallback, Item, ItemContext};
pub use self::layout::{ActionRow, Container, Label, Section, Separator, TextDisplay, Thumbnail};
pub use self::modal::{Modal, ModalValues, SubmitCallback};
pub use self::select::Select;
pub use self::store::{DispatchOutcome, SharedView, ViewStore};
pub use self::text_input::TextInput;
pub use self::view::{View, DEFAULT_VIEW_TIMEOUT};

use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

use crate::error::Result;
use crate::types::util::random_hex_id;

/// Longest custom id Discord accepts.
pub const MAX_CUSTOM_ID_LEN: usize = 100;

/// Interaction check shared by views and modals.
pub type InteractionCheck = Arc<dyn Fn(ItemContext) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Hook run when a view or modal times out.
pub type TimeoutHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UiError {
    #[error("row {0} is out of range (0..=4)")]
    InvalidRow(u8),

    #[error("row {0} has no room for an item of this width")]
    RowFull(u8),

    #[error("view has no room left for this item")]
    ViewFull,

    #[error("too many components: {count} (maximum {max})")]
    TooManyComponents { count: usize, max: usize },

    #[error("custom id is {0} characters long (maximum 100)")]
    CustomIdTooLong(usize),

    #[error("view without a message must have no timeout and only explicit custom ids")]
    NotPersistent,

    #[error("invalid modal: {0}")]
    InvalidModal(String),

    #[error("invalid dynamic item template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{0} is not allowed here")]
    UnsupportedItem(&'static str),
}

/// Custom id for items created without one.
pub(crate) fn generated_custom_id() -> String {
    random_hex_id()
}

pub(crate) fn check_custom_id(custom_id: &str) -> Result<(), UiError> {
    let len = custom_id.chars().count();
    if len > MAX_CUSTOM_ID_LEN {
        return Err(UiError::CustomIdTooLong(len));
    }
    Ok(())
}

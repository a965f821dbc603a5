use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

use super::{validate_menu_name, Check, CommandContext, CommandError};
use crate::error::Result;
use crate::types::application::IntegrationType;
use crate::types::command::{ApplicationCommand, CommandType, InteractionContextType};
use crate::types::guild::Member;
use crate::types::id::{marker::GuildMarker, Id};
use crate::types::interaction::CommandData;
use crate::types::message::Message;
use crate::types::permissions::Permissions;
use crate::types::user::User;

/// What a context menu was used on.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextMenuTarget {
    /// Member is set when used in a guild.
    User(User, Option<Member>),
    Message(Box<Message>),
}

impl ContextMenuTarget {
    pub(crate) fn resolve(kind: CommandType, data: &CommandData) -> Result<Self, CommandError> {
        let missing = || CommandError::transform("target", "target is missing from the resolved data");
        let target = data.target_id.ok_or_else(missing)?;
        let resolved = data.resolved.as_ref().ok_or_else(missing)?;
        match kind {
            CommandType::User => {
                let user = resolved.users.get(&target.cast()).cloned().ok_or_else(missing)?;
                Ok(Self::User(user, resolved.member(target.cast())))
            }
            CommandType::Message => resolved
                .messages
                .get(&target.cast())
                .cloned()
                .map(|message| Self::Message(Box::new(message)))
                .ok_or_else(missing),
            _ => Err(CommandError::transform("target", "not a context menu")),
        }
    }
}

pub type ContextMenuHandler =
    Arc<dyn Fn(CommandContext, ContextMenuTarget) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A user or message command shown in the right-click menu.
#[derive(Clone)]
pub struct ContextMenu {
    pub(crate) name: String,
    pub(crate) kind: CommandType,
    pub(crate) handler: ContextMenuHandler,
    pub(crate) checks: Vec<Check>,
    nsfw: bool,
    default_member_permissions: Option<Permissions>,
    contexts: Option<Vec<InteractionContextType>>,
    integration_types: Option<Vec<IntegrationType>>,
    pub(crate) guild: Option<Id<GuildMarker>>,
}

impl std::fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextMenu")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl ContextMenu {
    fn with_kind<F, Fut>(kind: CommandType, name: String, handler: F) -> Self
    where
        F: Fn(CommandContext, ContextMenuTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name,
            kind,
            handler: Arc::new(move |ctx, target| handler(ctx, target).boxed()),
            checks: Vec::new(),
            nsfw: false,
            default_member_permissions: None,
            contexts: None,
            integration_types: None,
            guild: None,
        }
    }

    pub fn user<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandContext, ContextMenuTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::with_kind(CommandType::User, name.into(), handler)
    }

    pub fn message<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandContext, ContextMenuTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::with_kind(CommandType::Message, name.into(), handler)
    }

    pub fn check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.checks.push(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn contexts(mut self, contexts: impl IntoIterator<Item = InteractionContextType>) -> Self {
        self.contexts = Some(contexts.into_iter().collect());
        self
    }

    pub fn integration_types(mut self, types: impl IntoIterator<Item = IntegrationType>) -> Self {
        self.integration_types = Some(types.into_iter().collect());
        self
    }

    pub fn guild(mut self, guild: Id<GuildMarker>) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        validate_menu_name(&self.name)
    }

    pub(crate) fn to_payload(&self) -> ApplicationCommand {
        ApplicationCommand {
            id: None,
            application_id: None,
            guild_id: None,
            kind: self.kind,
            name: self.name.clone(),
            name_localizations: None,
            description: String::new(),
            description_localizations: None,
            options: Vec::new(),
            default_member_permissions: self.default_member_permissions,
            nsfw: self.nsfw.then_some(true),
            integration_types: self.integration_types.clone(),
            contexts: self.contexts.clone(),
            version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::interaction::tests::user_json;
    use serde_json::json;

    #[test]
    fn resolves_user_target() {
        let data: CommandData = serde_json::from_value(json!({
            "id": "1",
            "name": "User Info",
            "type": 2,
            "target_id": "80351110224678912",
            "resolved": {
                "users": {"80351110224678912": user_json("80351110224678912")},
                "members": {"80351110224678912": {"roles": [], "nick": "Nelly"}}
            }
        }))
        .unwrap();
        match ContextMenuTarget::resolve(CommandType::User, &data).unwrap() {
            ContextMenuTarget::User(user, member) => {
                assert_eq!(user.id, Id::new(80351110224678912));
                assert_eq!(member.and_then(|m| m.nick).as_deref(), Some("Nelly"));
            }
            other => panic!("expected a user, got {other:?}"),
        }
        assert!(ContextMenuTarget::resolve(CommandType::Message, &data).is_err());
    }

    #[test]
    fn menu_payload_has_no_description() {
        let menu = ContextMenu::user("User Info", |_ctx, _target| async { Ok(()) });
        menu.validate().unwrap();
        let payload = serde_json::to_value(menu.to_payload()).unwrap();
        assert_eq!(payload["type"], 2);
        assert_eq!(payload["name"], "User Info");
        assert_eq!(payload["description"], "");
    }
}

//! Application commands: slash commands, subcommand groups and context
//! menus, registered in a [`CommandTree`] and dispatched from interactions.

mod args;
pub mod checks;
mod command;
mod context_menu;
mod group;
mod tree;

pub use self::args::{CommandArgs, FromOptionValue, Mentionable};
pub use self::command::{Command, Parameter};
pub use self::context_menu::{ContextMenu, ContextMenuTarget};
pub use self::group::Group;
pub use self::tree::{AppCommand, CommandTree};

use futures::future::BoxFuture;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::responder::InteractionResponder;
use crate::types::command::{CommandOptionChoice, CommandType};
use crate::types::id::{
    marker::{GuildMarker, SkuMarker},
    Id,
};
use crate::types::interaction::Interaction;
use crate::types::permissions::Permissions;

/// Most chat-input commands per scope.
pub const MAX_CHAT_INPUT_COMMANDS: usize = 100;
/// Most user or message context menus per scope.
pub const MAX_CONTEXT_MENUS: usize = 15;
/// Most options, subcommands or choices in one list.
pub const MAX_OPTIONS: usize = 25;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("invalid command {name:?}: {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("command {name:?} is already registered{}", scope_suffix(*.guild))]
    CommandAlreadyRegistered {
        name: String,
        guild: Option<Id<GuildMarker>>,
    },

    #[error("too many {kind:?} commands{} (maximum {limit})", scope_suffix(*.guild))]
    CommandLimitReached {
        kind: CommandType,
        guild: Option<Id<GuildMarker>>,
        limit: usize,
    },

    #[error("no command named {0:?}")]
    CommandNotFound(String),

    #[error("failed to convert option {name:?}: {reason}")]
    Transform { name: String, reason: String },

    #[error("this command cannot be used in private messages")]
    NoPrivateMessage,

    #[error("missing permissions: {0:?}")]
    MissingPermissions(Permissions),

    #[error("missing entitlement to SKU {0}")]
    MissingEntitlement(Id<SkuMarker>),

    #[error("check failed: {0}")]
    CheckFailure(String),
}

fn scope_suffix(guild: Option<Id<GuildMarker>>) -> String {
    guild.map(|id| format!(" in guild {id}")).unwrap_or_default()
}

impl CommandError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transform(name: &str, reason: impl Into<String>) -> Self {
        Self::Transform {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Everything a command handler gets.
#[derive(Clone, Debug)]
pub struct CommandContext {
    pub interaction: Arc<Interaction>,
    pub responder: InteractionResponder,
    /// Options of the invoked (sub)command.
    pub args: CommandArgs,
    /// Space separated path, e.g. `settings volume set`.
    pub qualified_name: String,
}

impl CommandContext {
    pub fn http(&self) -> &HttpClient {
        self.responder.http()
    }

    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        self.interaction.guild_id
    }
}

/// Slash command body.
pub type CommandHandler = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Runs before a handler; an `Err` stops the invocation.
pub type Check = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Called with the partially typed value of the focused option.
pub type AutocompleteHandler = Arc<
    dyn Fn(CommandContext, String) -> BoxFuture<'static, Result<Vec<CommandOptionChoice>>>
        + Send
        + Sync,
>;

/// Receives every error raised while running a command.
pub type ErrorHook = Arc<dyn Fn(CommandContext, Error) -> BoxFuture<'static, ()> + Send + Sync>;

const MAX_NAME_LEN: usize = 32;
const MAX_DESCRIPTION_LEN: usize = 100;

fn name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").ok())
        .as_ref()
}

/// Slash command, subcommand and option names.
pub(crate) fn validate_name(name: &str) -> Result<(), CommandError> {
    let matches = name_regex().is_some_and(|re| re.is_match(name));
    if !matches {
        return Err(CommandError::invalid(
            name,
            "names must be 1 to 32 letters, digits, '-' or '_'",
        ));
    }
    if name.to_lowercase() != name {
        return Err(CommandError::invalid(name, "names must be lowercase"));
    }
    Ok(())
}

pub(crate) fn validate_description(name: &str, description: &str) -> Result<(), CommandError> {
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(CommandError::invalid(
            name,
            format!("description must be 1 to {MAX_DESCRIPTION_LEN} characters, got {len}"),
        ));
    }
    Ok(())
}

/// Context menu names may hold spaces and capitals.
pub(crate) fn validate_menu_name(name: &str) -> Result<(), CommandError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(CommandError::invalid(
            name,
            format!("context menu names must be 1 to {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(validate_name("ping").is_ok());
        assert!(validate_name("set-volume_2").is_ok());
        assert!(validate_name("café").is_ok());
        assert!(validate_name("Ping").is_err());
        assert!(validate_name("two words").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(33)).is_err());

        assert!(validate_menu_name("User Info").is_ok());
        assert!(validate_menu_name("").is_err());
    }

    #[test]
    fn descriptions() {
        assert!(validate_description("x", "Pong!").is_ok());
        assert!(validate_description("x", "").is_err());
        assert!(validate_description("x", &"d".repeat(101)).is_err());
    }

    #[test]
    fn error_messages_name_the_scope() {
        let err = CommandError::CommandAlreadyRegistered {
            name: "ping".into(),
            guild: Some(Id::new(7)),
        };
        assert_eq!(err.to_string(), "command \"ping\" is already registered in guild 7");
        let err = CommandError::CommandLimitReached {
            kind: CommandType::User,
            guild: None,
            limit: 15,
        };
        assert_eq!(err.to_string(), "too many User commands (maximum 15)");
    }
}

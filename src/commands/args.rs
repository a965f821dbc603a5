use std::sync::Arc;

use super::CommandError;
use crate::types::channel::Channel;
use crate::types::command::CommandOptionType;
use crate::types::guild::{Member, Role};
use crate::types::id::{
    marker::{AttachmentMarker, ChannelMarker, GenericMarker, RoleMarker, UserMarker},
    Id,
};
use crate::types::interaction::{CommandDataOption, CommandOptionValue, ResolvedData};
use crate::types::message::Attachment;
use crate::types::user::User;

/// Converts one option value, with the resolved objects at hand.
///
/// The error is a short reason; [`CommandArgs::get`] turns it into
/// [`CommandError::Transform`] with the option name attached.
pub trait FromOptionValue: Sized {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &CommandOptionValue) -> String {
    format!("expected {expected}, got {:?}", value.kind())
}

fn unresolved(what: &str, id: impl std::fmt::Display) -> String {
    format!("{what} {id} is missing from the resolved data")
}

impl FromOptionValue for String {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::String(s) => Ok(s.clone()),
            other => Err(mismatch("a string", other)),
        }
    }
}

impl FromOptionValue for i64 {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Integer(i) => Ok(*i),
            other => Err(mismatch("an integer", other)),
        }
    }
}

impl FromOptionValue for f64 {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Number(n) => Ok(*n),
            CommandOptionValue::Integer(i) => Ok(*i as f64),
            other => Err(mismatch("a number", other)),
        }
    }
}

impl FromOptionValue for bool {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Boolean(b) => Ok(*b),
            other => Err(mismatch("a boolean", other)),
        }
    }
}

impl FromOptionValue for Id<UserMarker> {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::User(id) => Ok(*id),
            other => Err(mismatch("a user", other)),
        }
    }
}

impl FromOptionValue for User {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id = Id::<UserMarker>::from_option(value, resolved)?;
        resolved
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| unresolved("user", id))
    }
}

impl FromOptionValue for Member {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id = Id::<UserMarker>::from_option(value, resolved)?;
        resolved.member(id).ok_or_else(|| unresolved("member", id))
    }
}

impl FromOptionValue for Id<ChannelMarker> {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Channel(id) => Ok(*id),
            other => Err(mismatch("a channel", other)),
        }
    }
}

impl FromOptionValue for Channel {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id = Id::<ChannelMarker>::from_option(value, resolved)?;
        resolved
            .channels
            .get(&id)
            .cloned()
            .ok_or_else(|| unresolved("channel", id))
    }
}

impl FromOptionValue for Id<RoleMarker> {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Role(id) => Ok(*id),
            other => Err(mismatch("a role", other)),
        }
    }
}

impl FromOptionValue for Role {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id = Id::<RoleMarker>::from_option(value, resolved)?;
        resolved
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| unresolved("role", id))
    }
}

impl FromOptionValue for Id<AttachmentMarker> {
    fn from_option(value: &CommandOptionValue, _: &ResolvedData) -> Result<Self, String> {
        match value {
            CommandOptionValue::Attachment(id) => Ok(*id),
            other => Err(mismatch("an attachment", other)),
        }
    }
}

impl FromOptionValue for Attachment {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id = Id::<AttachmentMarker>::from_option(value, resolved)?;
        resolved
            .attachments
            .get(&id)
            .cloned()
            .ok_or_else(|| unresolved("attachment", id))
    }
}

/// Target of a mentionable option.
#[derive(Clone, Debug, PartialEq)]
pub enum Mentionable {
    /// Carries the member too when used in a guild.
    User(User, Option<Member>),
    Role(Role),
}

impl FromOptionValue for Mentionable {
    fn from_option(value: &CommandOptionValue, resolved: &ResolvedData) -> Result<Self, String> {
        let id: Id<GenericMarker> = match value {
            CommandOptionValue::Mentionable(id) => *id,
            CommandOptionValue::User(id) => id.cast(),
            CommandOptionValue::Role(id) => id.cast(),
            other => return Err(mismatch("a user or role", other)),
        };
        if let Some(user) = resolved.users.get(&id.cast()) {
            return Ok(Self::User(user.clone(), resolved.member(id.cast())));
        }
        resolved
            .roles
            .get(&id.cast())
            .cloned()
            .map(Self::Role)
            .ok_or_else(|| unresolved("mentionable", id))
    }
}

/// Options of the invoked command or subcommand, by name.
#[derive(Clone, Debug, Default)]
pub struct CommandArgs {
    options: Arc<Vec<CommandDataOption>>,
    resolved: Arc<ResolvedData>,
}

impl CommandArgs {
    pub(crate) fn new(options: Vec<CommandDataOption>, resolved: ResolvedData) -> Self {
        Self {
            options: Arc::new(options),
            resolved: Arc::new(resolved),
        }
    }

    pub fn raw(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub fn resolved(&self) -> &ResolvedData {
        &self.resolved
    }

    /// Name and partial value of the option being autocompleted.
    pub fn focused(&self) -> Option<(&str, &str)> {
        self.options.iter().find_map(|option| match &option.value {
            CommandOptionValue::Focused(partial, _) => Some((option.name.as_str(), partial.as_str())),
            _ => None,
        })
    }

    /// Required option; missing or mistyped is a transform error.
    pub fn get<T: FromOptionValue>(&self, name: &str) -> Result<T, CommandError> {
        self.optional(name)?
            .ok_or_else(|| CommandError::transform(name, "missing required option"))
    }

    /// Optional option; mistyped is still an error.
    pub fn optional<T: FromOptionValue>(&self, name: &str) -> Result<Option<T>, CommandError> {
        self.raw(name)
            .map(|value| {
                T::from_option(value, &self.resolved)
                    .map_err(|reason| CommandError::transform(name, reason))
            })
            .transpose()
    }

    pub fn string(&self, name: &str) -> Result<String, CommandError> {
        self.get(name)
    }

    pub fn integer(&self, name: &str) -> Result<i64, CommandError> {
        self.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, CommandError> {
        self.get(name)
    }

    pub fn boolean(&self, name: &str) -> Result<bool, CommandError> {
        self.get(name)
    }

    pub fn user(&self, name: &str) -> Result<User, CommandError> {
        self.get(name)
    }

    pub fn member(&self, name: &str) -> Result<Member, CommandError> {
        self.get(name)
    }

    pub fn channel(&self, name: &str) -> Result<Channel, CommandError> {
        self.get(name)
    }

    pub fn role(&self, name: &str) -> Result<Role, CommandError> {
        self.get(name)
    }

    pub fn attachment(&self, name: &str) -> Result<Attachment, CommandError> {
        self.get(name)
    }

    pub fn mentionable(&self, name: &str) -> Result<Mentionable, CommandError> {
        self.get(name)
    }

    /// Whether a value fits the declared option type.
    pub(crate) fn kind_matches(value: &CommandOptionValue, kind: CommandOptionType) -> bool {
        let actual = value.kind();
        actual == kind
            || (kind == CommandOptionType::Number && actual == CommandOptionType::Integer)
            || (kind == CommandOptionType::Mentionable
                && matches!(actual, CommandOptionType::User | CommandOptionType::Role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::interaction::tests::user_json;
    use serde_json::json;

    fn args() -> CommandArgs {
        let options: Vec<CommandDataOption> = serde_json::from_value(json!([
            {"name": "text", "type": 3, "value": "hello"},
            {"name": "count", "type": 4, "value": 3},
            {"name": "ratio", "type": 10, "value": 0.5},
            {"name": "target", "type": 6, "value": "80351110224678912"},
            {"name": "who", "type": 9, "value": "41771983423143936"},
            {"name": "ghost", "type": 6, "value": "1"}
        ]))
        .unwrap();
        let resolved: ResolvedData = serde_json::from_value(json!({
            "users": {"80351110224678912": user_json("80351110224678912")},
            "members": {"80351110224678912": {"nick": "Nelly", "roles": [], "permissions": "8"}},
            "roles": {"41771983423143936": {"id": "41771983423143936", "name": "mods", "permissions": "0"}}
        }))
        .unwrap();
        CommandArgs::new(options, resolved)
    }

    #[test]
    fn typed_getters() {
        let args = args();
        assert_eq!(args.string("text").unwrap(), "hello");
        assert_eq!(args.integer("count").unwrap(), 3);
        assert_eq!(args.number("count").unwrap(), 3.0);
        assert_eq!(args.number("ratio").unwrap(), 0.5);
        assert_eq!(args.user("target").unwrap().id, Id::new(80351110224678912));

        let member = args.member("target").unwrap();
        assert_eq!(member.nick.as_deref(), Some("Nelly"));
        assert!(member.user.is_some());

        match args.mentionable("who").unwrap() {
            Mentionable::Role(role) => assert_eq!(role.name, "mods"),
            other => panic!("expected a role, got {other:?}"),
        }
        assert!(matches!(
            args.mentionable("target").unwrap(),
            Mentionable::User(_, Some(_))
        ));
    }

    #[test]
    fn transform_errors() {
        let args = args();
        assert!(matches!(
            args.integer("text"),
            Err(CommandError::Transform { name, .. }) if name == "text"
        ));
        assert!(matches!(args.string("nope"), Err(CommandError::Transform { .. })));
        assert!(matches!(args.user("ghost"), Err(CommandError::Transform { .. })));
        assert_eq!(args.optional::<String>("nope").unwrap(), None);
        assert!(args.optional::<bool>("text").is_err());
    }
}

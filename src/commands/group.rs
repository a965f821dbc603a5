use futures::FutureExt;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use super::command::Command;
use super::{validate_description, validate_name, Check, CommandContext, CommandError, MAX_OPTIONS};
use crate::error::Result;
use crate::types::application::IntegrationType;
use crate::types::command::{
    ApplicationCommand, CommandOption, CommandOptionType, CommandType, InteractionContextType,
};
use crate::types::id::{marker::GuildMarker, Id};
use crate::types::permissions::Permissions;

/// A slash command made of subcommands, e.g. `/settings volume`.
///
/// A top-level group may contain groups of its own, which then hold only
/// subcommands. Checks on a group run before those of the subcommand.
#[derive(Clone)]
pub struct Group {
    pub(crate) name: String,
    description: String,
    pub(crate) commands: Vec<Command>,
    pub(crate) groups: Vec<Group>,
    pub(crate) checks: Vec<Check>,
    nsfw: bool,
    default_member_permissions: Option<Permissions>,
    contexts: Option<Vec<InteractionContextType>>,
    integration_types: Option<Vec<IntegrationType>>,
    pub(crate) guild: Option<Id<GuildMarker>>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Group {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            commands: Vec::new(),
            groups: Vec::new(),
            checks: Vec::new(),
            nsfw: false,
            default_member_permissions: None,
            contexts: None,
            integration_types: None,
            guild: None,
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
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

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<(), CommandError> {
        validate_name(&self.name)?;
        validate_description(&self.name, &self.description)?;
        if depth > 0 && !self.groups.is_empty() {
            return Err(CommandError::invalid(
                &self.name,
                "groups can only be nested one level deep",
            ));
        }
        let children = self.commands.len() + self.groups.len();
        if children == 0 {
            return Err(CommandError::invalid(&self.name, "a group needs at least one subcommand"));
        }
        if children > MAX_OPTIONS {
            return Err(CommandError::invalid(
                &self.name,
                format!("at most {MAX_OPTIONS} subcommands, got {children}"),
            ));
        }
        let mut seen = HashSet::new();
        let names = self
            .commands
            .iter()
            .map(|command| command.name.as_str())
            .chain(self.groups.iter().map(|group| group.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(CommandError::invalid(
                    &self.name,
                    format!("duplicate subcommand {name:?}"),
                ));
            }
        }
        for command in &self.commands {
            command.validate()?;
        }
        for group in &self.groups {
            group.validate_at(depth + 1)?;
        }
        Ok(())
    }

    fn options(&self) -> Vec<CommandOption> {
        self.commands
            .iter()
            .map(Command::to_subcommand)
            .chain(self.groups.iter().map(|group| {
                let mut option = CommandOption::new(
                    CommandOptionType::SubCommandGroup,
                    group.name.clone(),
                    group.description.clone(),
                );
                option.options = Some(group.options());
                option
            }))
            .collect()
    }

    pub(crate) fn to_payload(&self) -> ApplicationCommand {
        ApplicationCommand {
            id: None,
            application_id: None,
            guild_id: None,
            kind: CommandType::ChatInput,
            name: self.name.clone(),
            name_localizations: None,
            description: self.description.clone(),
            description_localizations: None,
            options: self.options(),
            default_member_permissions: self.default_member_permissions,
            nsfw: self.nsfw.then_some(true),
            integration_types: self.integration_types.clone(),
            contexts: self.contexts.clone(),
            version: None,
        }
    }

    /// Every subcommand with its space separated path.
    pub(crate) fn walk<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Command)>) {
        let path = format!("{prefix}{}", self.name);
        for command in &self.commands {
            out.push((format!("{path} {}", command.name), command));
        }
        for group in &self.groups {
            group.walk(&format!("{path} "), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Command {
        Command::new(name, "leaf", |_ctx| async { Ok(()) })
    }

    #[test]
    fn nested_payload() {
        let group = Group::new("settings", "Bot settings")
            .command(leaf("show"))
            .group(Group::new("volume", "Volume").command(leaf("set")).command(leaf("mute")));
        group.validate().unwrap();

        let payload = serde_json::to_value(group.to_payload()).unwrap();
        assert_eq!(payload["options"][0]["type"], 1);
        assert_eq!(payload["options"][0]["name"], "show");
        assert_eq!(payload["options"][1]["type"], 2);
        assert_eq!(payload["options"][1]["options"][1]["name"], "mute");

        let mut walked = Vec::new();
        group.walk("", &mut walked);
        let names: Vec<_> = walked.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["settings show", "settings volume set", "settings volume mute"]);
    }

    #[test]
    fn depth_and_size_limits() {
        let too_deep = Group::new("a", "a").group(
            Group::new("b", "b").group(Group::new("c", "c").command(leaf("d"))),
        );
        assert!(matches!(too_deep.validate(), Err(CommandError::InvalidCommand { .. })));

        assert!(Group::new("empty", "e").validate().is_err());
        assert!(Group::new("dupe", "d").command(leaf("x")).command(leaf("x")).validate().is_err());

        let mut wide = Group::new("wide", "w");
        for i in 0..26 {
            wide = wide.command(leaf(&format!("c{i}")));
        }
        assert!(wide.validate().is_err());
    }
}

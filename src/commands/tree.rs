use futures::FutureExt;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::args::CommandArgs;
use super::command::Command;
use super::context_menu::{ContextMenu, ContextMenuTarget};
use super::group::Group;
use super::{
    Check, CommandContext, CommandError, ErrorHook, MAX_CHAT_INPUT_COMMANDS, MAX_CONTEXT_MENUS,
    MAX_OPTIONS,
};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::responder::InteractionResponder;
use crate::types::command::{ApplicationCommand, CommandType};
use crate::types::id::{
    marker::{ApplicationMarker, GuildMarker},
    Id,
};
use crate::types::interaction::{CommandData, CommandDataOption, CommandOptionValue, Interaction};

/// Anything that registers as one top-level application command.
#[derive(Clone, Debug)]
pub enum AppCommand {
    Slash(Command),
    Group(Group),
    ContextMenu(ContextMenu),
}

impl From<Command> for AppCommand {
    fn from(command: Command) -> Self {
        Self::Slash(command)
    }
}

impl From<Group> for AppCommand {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

impl From<ContextMenu> for AppCommand {
    fn from(menu: ContextMenu) -> Self {
        Self::ContextMenu(menu)
    }
}

impl AppCommand {
    pub fn name(&self) -> &str {
        match self {
            Self::Slash(command) => &command.name,
            Self::Group(group) => &group.name,
            Self::ContextMenu(menu) => &menu.name,
        }
    }

    pub fn kind(&self) -> CommandType {
        match self {
            Self::Slash(_) | Self::Group(_) => CommandType::ChatInput,
            Self::ContextMenu(menu) => menu.kind,
        }
    }

    fn guild(&self) -> Option<Id<GuildMarker>> {
        match self {
            Self::Slash(command) => command.guild,
            Self::Group(group) => group.guild,
            Self::ContextMenu(menu) => menu.guild,
        }
    }

    fn validate(&self) -> Result<(), CommandError> {
        match self {
            Self::Slash(command) => command.validate(),
            Self::Group(group) => group.validate(),
            Self::ContextMenu(menu) => menu.validate(),
        }
    }

    pub fn to_payload(&self) -> ApplicationCommand {
        match self {
            Self::Slash(command) => command.to_payload(),
            Self::Group(group) => group.to_payload(),
            Self::ContextMenu(menu) => menu.to_payload(),
        }
    }
}

/// Commands of one scope: global, or a single guild.
#[derive(Clone, Debug, Default)]
struct Scope {
    chat_input: BTreeMap<String, AppCommand>,
    user: BTreeMap<String, AppCommand>,
    message: BTreeMap<String, AppCommand>,
}

impl Scope {
    fn map(&self, kind: CommandType) -> Option<&BTreeMap<String, AppCommand>> {
        match kind {
            CommandType::ChatInput => Some(&self.chat_input),
            CommandType::User => Some(&self.user),
            CommandType::Message => Some(&self.message),
            CommandType::PrimaryEntryPoint => None,
        }
    }

    fn map_mut(&mut self, kind: CommandType) -> Option<&mut BTreeMap<String, AppCommand>> {
        match kind {
            CommandType::ChatInput => Some(&mut self.chat_input),
            CommandType::User => Some(&mut self.user),
            CommandType::Message => Some(&mut self.message),
            CommandType::PrimaryEntryPoint => None,
        }
    }

    fn commands(&self) -> impl Iterator<Item = &AppCommand> {
        self.chat_input
            .values()
            .chain(self.user.values())
            .chain(self.message.values())
    }

    fn is_empty(&self) -> bool {
        self.chat_input.is_empty() && self.user.is_empty() && self.message.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Target<'a> {
    Slash(&'a Command),
    Menu(&'a ContextMenu),
}

/// A command found for an interaction, with the checks on its path.
struct Resolved<'a> {
    target: Target<'a>,
    checks: Vec<Check>,
    options: Vec<CommandDataOption>,
    path: String,
}

/// Registry of application commands, global and per guild.
///
/// Build it up front, [`sync`](Self::sync) it once the application id is
/// known, and feed command and autocomplete interactions to
/// [`dispatch`](Self::dispatch) and [`autocomplete`](Self::autocomplete).
#[derive(Clone, Default)]
pub struct CommandTree {
    global: Scope,
    guilds: HashMap<Id<GuildMarker>, Scope>,
    checks: Vec<Check>,
    on_error: Option<ErrorHook>,
}

impl std::fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTree")
            .field("global", &self.global)
            .field("guilds", &self.guilds)
            .field("checks", &self.checks.len())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn scope(&self, guild: Option<Id<GuildMarker>>) -> Option<&Scope> {
        match guild {
            Some(id) => self.guilds.get(&id),
            None => Some(&self.global),
        }
    }

    fn scope_mut(&mut self, guild: Option<Id<GuildMarker>>) -> &mut Scope {
        match guild {
            Some(id) => self.guilds.entry(id).or_default(),
            None => &mut self.global,
        }
    }

    /// Register a command. `guild` overrides the command's own guild
    /// restriction.
    pub fn add_command(
        &mut self,
        command: impl Into<AppCommand>,
        guild: Option<Id<GuildMarker>>,
        override_existing: bool,
    ) -> Result<(), CommandError> {
        let command = command.into();
        command.validate()?;
        let guild = guild.or(command.guild());
        let kind = command.kind();
        let limit = match kind {
            CommandType::ChatInput => MAX_CHAT_INPUT_COMMANDS,
            _ => MAX_CONTEXT_MENUS,
        };
        let name = command.name().to_string();
        let map = self.scope_mut(guild).map_mut(kind).ok_or_else(|| {
            CommandError::invalid(&name, "entry point commands cannot be registered")
        })?;
        if map.contains_key(&name) {
            if !override_existing {
                return Err(CommandError::CommandAlreadyRegistered { name, guild });
            }
        } else if map.len() >= limit {
            return Err(CommandError::CommandLimitReached { kind, guild, limit });
        }
        debug!(command = %name, ?kind, ?guild, "registered command");
        map.insert(name, command);
        Ok(())
    }

    pub fn remove_command(
        &mut self,
        name: &str,
        guild: Option<Id<GuildMarker>>,
        kind: CommandType,
    ) -> Option<AppCommand> {
        let Some(id) = guild else {
            return self.global.map_mut(kind)?.remove(name);
        };
        let scope = self.guilds.get_mut(&id)?;
        let removed = scope.map_mut(kind)?.remove(name);
        if scope.is_empty() {
            self.guilds.remove(&id);
        }
        removed
    }

    pub fn get_command(
        &self,
        name: &str,
        guild: Option<Id<GuildMarker>>,
        kind: CommandType,
    ) -> Option<&AppCommand> {
        self.scope(guild)?.map(kind)?.get(name)
    }

    /// Top-level commands of one scope.
    pub fn get_commands(&self, guild: Option<Id<GuildMarker>>) -> Vec<&AppCommand> {
        self.scope(guild)
            .map(|scope| scope.commands().collect())
            .unwrap_or_default()
    }

    /// Every slash command and subcommand of one scope, by qualified name.
    pub fn walk_commands(&self, guild: Option<Id<GuildMarker>>) -> Vec<(String, &Command)> {
        let mut out = Vec::new();
        for command in self.get_commands(guild) {
            match command {
                AppCommand::Slash(command) => out.push((command.name.clone(), command)),
                AppCommand::Group(group) => group.walk("", &mut out),
                AppCommand::ContextMenu(_) => {}
            }
        }
        out
    }

    /// Drop every command of one scope, or only those of `kind`.
    pub fn clear_commands(&mut self, guild: Option<Id<GuildMarker>>, kind: Option<CommandType>) {
        let scope = self.scope_mut(guild);
        match kind {
            Some(kind) => {
                if let Some(map) = scope.map_mut(kind) {
                    map.clear();
                }
            }
            None => *scope = Scope::default(),
        }
        if let Some(id) = guild {
            if self.guilds.get(&id).is_some_and(Scope::is_empty) {
                self.guilds.remove(&id);
            }
        }
    }

    /// Guilds holding guild-only commands.
    pub fn guild_ids(&self) -> Vec<Id<GuildMarker>> {
        self.guilds.keys().copied().collect()
    }

    /// Runs before every command, ahead of the command's own checks.
    pub fn check<F, Fut>(&mut self, f: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.checks.push(Arc::new(move |ctx| f(ctx).boxed()));
    }

    pub fn on_error<F, Fut>(&mut self, f: F)
    where
        F: Fn(CommandContext, Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error = Some(Arc::new(move |ctx, err| f(ctx, err).boxed()));
    }

    pub fn to_payload(&self, guild: Option<Id<GuildMarker>>) -> Vec<ApplicationCommand> {
        self.get_commands(guild)
            .into_iter()
            .map(AppCommand::to_payload)
            .collect()
    }

    /// Replace the registered commands of one scope with this tree's.
    pub async fn sync(
        &self,
        http: &HttpClient,
        application_id: Id<ApplicationMarker>,
        guild: Option<Id<GuildMarker>>,
    ) -> Result<Vec<ApplicationCommand>> {
        let payload = self.to_payload(guild);
        info!(count = payload.len(), ?guild, "syncing application commands");
        Ok(http
            .bulk_overwrite_commands(application_id, guild, &payload)
            .await?)
    }

    pub async fn fetch_commands(
        &self,
        http: &HttpClient,
        application_id: Id<ApplicationMarker>,
        guild: Option<Id<GuildMarker>>,
    ) -> Result<Vec<ApplicationCommand>> {
        Ok(http.commands(application_id, guild, false).await?)
    }

    fn lookup(&self, data: &CommandData) -> Option<&AppCommand> {
        let guild = data
            .guild_id
            .and_then(|id| self.guilds.get(&id))
            .and_then(|scope| scope.map(data.kind))
            .and_then(|map| map.get(&data.name));
        guild.or_else(|| self.global.map(data.kind)?.get(&data.name))
    }

    fn resolve(&self, data: &CommandData) -> Result<Resolved<'_>, CommandError> {
        let not_found = |path: &str| CommandError::CommandNotFound(path.to_string());
        let node = self.lookup(data).ok_or_else(|| not_found(&data.name))?;
        match node {
            AppCommand::Slash(command) => Ok(Resolved {
                target: Target::Slash(command),
                checks: command.checks.clone(),
                options: data.options.clone(),
                path: command.name.clone(),
            }),
            AppCommand::ContextMenu(menu) => Ok(Resolved {
                target: Target::Menu(menu),
                checks: menu.checks.clone(),
                options: Vec::new(),
                path: menu.name.clone(),
            }),
            AppCommand::Group(group) => {
                let mut checks = group.checks.clone();
                let mut path = group.name.clone();
                let mut group = group;
                let mut options = data.options.as_slice();
                loop {
                    let Some(first) = options.first() else {
                        return Err(not_found(&path));
                    };
                    path = format!("{path} {}", first.name);
                    match &first.value {
                        CommandOptionValue::SubCommandGroup(nested) => {
                            group = group.get_group(&first.name).ok_or_else(|| not_found(&path))?;
                            checks.extend(group.checks.iter().cloned());
                            options = nested.as_slice();
                        }
                        CommandOptionValue::SubCommand(nested) => {
                            let command =
                                group.get_command(&first.name).ok_or_else(|| not_found(&path))?;
                            checks.extend(command.checks.iter().cloned());
                            return Ok(Resolved {
                                target: Target::Slash(command),
                                checks,
                                options: nested.clone(),
                                path,
                            });
                        }
                        _ => return Err(not_found(&path)),
                    }
                }
            }
        }
    }

    fn context(
        interaction: &Arc<Interaction>,
        responder: InteractionResponder,
        data: &CommandData,
        resolved: &Resolved<'_>,
    ) -> CommandContext {
        CommandContext {
            interaction: interaction.clone(),
            responder,
            args: CommandArgs::new(resolved.options.clone(), data.resolved.clone().unwrap_or_default()),
            qualified_name: resolved.path.clone(),
        }
    }

    /// Run the command an interaction invokes.
    ///
    /// Check and handler errors go to the `on_error` hook; without one they
    /// are logged and returned.
    pub async fn dispatch(
        &self,
        interaction: Arc<Interaction>,
        responder: InteractionResponder,
    ) -> Result<()> {
        let data = interaction
            .command_data()
            .ok_or_else(|| Error::InvalidArgument("not an application command".into()))?;
        let resolved = self.resolve(data)?;
        let ctx = Self::context(&interaction, responder, data, &resolved);
        debug!(command = %ctx.qualified_name, "dispatching command");
        match self.invoke(&resolved, data, ctx.clone()).await {
            Ok(()) => Ok(()),
            Err(err) => self.report(ctx, err).await,
        }
    }

    async fn invoke(&self, resolved: &Resolved<'_>, data: &CommandData, ctx: CommandContext) -> Result<()> {
        for check in self.checks.iter().chain(&resolved.checks) {
            check(ctx.clone()).await?;
        }
        match resolved.target {
            Target::Slash(command) => {
                command.check_args(&ctx.args)?;
                (command.handler)(ctx).await
            }
            Target::Menu(menu) => {
                let target = ContextMenuTarget::resolve(menu.kind, data)?;
                (menu.handler)(ctx, target).await
            }
        }
    }

    async fn report(&self, ctx: CommandContext, err: Error) -> Result<()> {
        match &self.on_error {
            Some(hook) => {
                hook(ctx, err).await;
                Ok(())
            }
            None => {
                error!(command = %ctx.qualified_name, error = %err, "command failed");
                Err(err)
            }
        }
    }

    /// Answer an autocomplete interaction from the focused parameter's
    /// callback. Parameters without one get an empty list.
    pub async fn autocomplete(
        &self,
        interaction: Arc<Interaction>,
        responder: InteractionResponder,
    ) -> Result<()> {
        let data = interaction
            .command_data()
            .ok_or_else(|| Error::InvalidArgument("not an autocomplete interaction".into()))?;
        let resolved = self.resolve(data)?;
        let Target::Slash(command) = resolved.target else {
            return Err(CommandError::CommandNotFound(resolved.path).into());
        };
        let ctx = Self::context(&interaction, responder, data, &resolved);
        let Some((name, partial)) = ctx.args.focused().map(|(n, p)| (n.to_string(), p.to_string()))
        else {
            return Err(Error::InvalidArgument("no focused option".into()));
        };
        let Some(handler) = command
            .get_parameter(&name)
            .and_then(|parameter| parameter.autocomplete.clone())
        else {
            debug!(command = %ctx.qualified_name, option = %name, "no autocomplete callback");
            return ctx.responder.autocomplete(Vec::new()).await;
        };
        match handler(ctx.clone(), partial).await {
            Ok(mut choices) => {
                choices.truncate(MAX_OPTIONS);
                ctx.responder.autocomplete(choices).await
            }
            Err(err) => self.report(ctx, err).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Parameter;
    use crate::config::ClientConfig;
    use crate::types::command::CommandOptionChoice;
    use crate::types::interaction::tests::interaction_json;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn noop(name: &str) -> Command {
        Command::new(name, "test command", |_ctx| async { Ok(()) })
    }

    fn command_interaction(kind: u8, data: Value) -> (Arc<Interaction>, InteractionResponder) {
        let interaction: Interaction = serde_json::from_value(interaction_json(kind, data)).unwrap();
        let http = HttpClient::from_token("t").unwrap();
        let responder = InteractionResponder::new(http, &interaction);
        (Arc::new(interaction), responder)
    }

    #[test]
    fn duplicates_and_overrides() {
        let mut tree = CommandTree::new();
        tree.add_command(noop("ping"), None, false).unwrap();
        assert_eq!(
            tree.add_command(noop("ping"), None, false).unwrap_err(),
            CommandError::CommandAlreadyRegistered {
                name: "ping".into(),
                guild: None
            }
        );
        tree.add_command(noop("ping"), None, true).unwrap();
        tree.add_command(noop("ping"), Some(Id::new(5)), false).unwrap();
        assert_eq!(tree.get_commands(None).len(), 1);
        assert_eq!(tree.guild_ids(), vec![Id::new(5)]);

        assert!(tree.remove_command("ping", Some(Id::new(5)), CommandType::ChatInput).is_some());
        assert!(tree.guild_ids().is_empty());
        assert!(tree.remove_command("ping", Some(Id::new(6)), CommandType::ChatInput).is_none());
        assert!(tree
            .remove_command("ping", Some(Id::new(6)), CommandType::PrimaryEntryPoint)
            .is_none());
        assert!(tree.guild_ids().is_empty());
        assert!(tree.get_command("ping", None, CommandType::ChatInput).is_some());
        assert!(tree.get_command("ping", None, CommandType::User).is_none());
    }

    #[test]
    fn scope_limits() {
        let mut tree = CommandTree::new();
        for i in 0..MAX_CHAT_INPUT_COMMANDS {
            tree.add_command(noop(&format!("c{i}")), None, false).unwrap();
        }
        assert!(matches!(
            tree.add_command(noop("one-more"), None, false),
            Err(CommandError::CommandLimitReached { limit: 100, .. })
        ));
        // Replacing does not count against the limit.
        tree.add_command(noop("c0"), None, true).unwrap();

        for i in 0..MAX_CONTEXT_MENUS {
            let menu = ContextMenu::user(format!("Menu {i}"), |_ctx, _target| async { Ok(()) });
            tree.add_command(menu, None, false).unwrap();
        }
        let extra = ContextMenu::user("Extra", |_ctx, _target| async { Ok(()) });
        assert!(matches!(
            tree.add_command(extra, None, false),
            Err(CommandError::CommandLimitReached { kind: CommandType::User, limit: 15, .. })
        ));
        let message_menu = ContextMenu::message("Quote", |_ctx, _target| async { Ok(()) });
        tree.add_command(message_menu, None, false).unwrap();

        tree.clear_commands(None, Some(CommandType::User));
        assert_eq!(tree.get_commands(None).len(), MAX_CHAT_INPUT_COMMANDS + 1);
        tree.clear_commands(None, None);
        assert!(tree.get_commands(None).is_empty());
    }

    #[test]
    fn invalid_commands_are_not_registered() {
        let mut tree = CommandTree::new();
        assert!(matches!(
            tree.add_command(noop("Bad Name"), None, false),
            Err(CommandError::InvalidCommand { .. })
        ));
        assert!(tree.get_commands(None).is_empty());
    }

    #[test]
    fn payload_and_walk() {
        let mut tree = CommandTree::new();
        tree.add_command(noop("ping"), None, false).unwrap();
        tree.add_command(
            Group::new("settings", "Settings").command(noop("show")).group(
                Group::new("volume", "Volume").command(noop("set")),
            ),
            None,
            false,
        )
        .unwrap();
        tree.add_command(noop("local").guild(Id::new(9)), None, false).unwrap();

        let names: Vec<_> = tree
            .walk_commands(None)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["ping", "settings show", "settings volume set"]);

        let payload = tree.to_payload(None);
        assert_eq!(payload.len(), 2);
        assert_eq!(tree.to_payload(Some(Id::new(9)))[0].name, "local");
    }

    #[tokio::test]
    async fn dispatches_subcommands_with_args() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let set = Command::new("set", "Set the volume", move |ctx| {
            let sink = sink.clone();
            async move {
                let level = ctx.args.integer("level")?;
                *sink.lock().unwrap() = Some((ctx.qualified_name.clone(), level));
                Ok(())
            }
        })
        .parameter(Parameter::integer("level", "Level"));

        let mut tree = CommandTree::new();
        tree.add_command(
            Group::new("settings", "Settings").group(Group::new("volume", "Volume").command(set)),
            None,
            false,
        )
        .unwrap();

        let (interaction, responder) = command_interaction(
            2,
            json!({
                "id": "1", "name": "settings", "type": 1,
                "options": [{"name": "volume", "type": 2, "options": [
                    {"name": "set", "type": 1, "options": [{"name": "level", "type": 4, "value": 7}]}
                ]}]
            }),
        );
        tree.dispatch(interaction, responder).await.unwrap();
        assert_eq!(
            seen.lock().unwrap().clone(),
            Some(("settings volume set".to_string(), 7))
        );

        let (interaction, responder) = command_interaction(
            2,
            json!({"id": "1", "name": "settings", "type": 1, "options": [
                {"name": "missing", "type": 1, "options": []}
            ]}),
        );
        assert!(matches!(
            tree.dispatch(interaction, responder).await,
            Err(Error::Command(CommandError::CommandNotFound(path))) if path == "settings missing"
        ));
    }

    #[tokio::test]
    async fn guild_scope_wins() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut tree = CommandTree::new();
        for (label, guild) in [("global", None), ("guild", Some(Id::new(290926798626357999)))] {
            let hits = hits.clone();
            let command = Command::new("where", "Which scope", move |_ctx| {
                let hits = hits.clone();
                async move {
                    hits.lock().unwrap().push(label);
                    Ok(())
                }
            });
            tree.add_command(command, guild, false).unwrap();
        }

        let (interaction, responder) = command_interaction(
            2,
            json!({"id": "1", "name": "where", "type": 1, "guild_id": "290926798626357999"}),
        );
        tree.dispatch(interaction, responder).await.unwrap();
        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "where", "type": 1}));
        tree.dispatch(interaction, responder).await.unwrap();
        assert_eq!(*hits.lock().unwrap(), ["guild", "global"]);
    }

    #[tokio::test]
    async fn failures_reach_the_error_hook() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let ran = Arc::new(AtomicUsize::new(0));

        let mut tree = CommandTree::new();
        let counter = ran.clone();
        tree.add_command(
            Command::new("guarded", "Always rejected", move |_ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .check(|_ctx| async { Err(Error::from(CommandError::CheckFailure("nope".into()))) }),
            None,
            false,
        )
        .unwrap();
        tree.add_command(
            noop("needs").parameter(Parameter::string("text", "Some text")),
            None,
            false,
        )
        .unwrap();

        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "guarded", "type": 1}));
        assert!(matches!(
            tree.dispatch(interaction, responder).await,
            Err(Error::Command(CommandError::CheckFailure(_)))
        ));

        let sink = errors.clone();
        tree.on_error(move |ctx, err| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((ctx.qualified_name, err.to_string()));
            }
        });
        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "guarded", "type": 1}));
        tree.dispatch(interaction, responder).await.unwrap();
        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "needs", "type": 1}));
        tree.dispatch(interaction, responder).await.unwrap();

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0, "guarded");
        assert_eq!(errors[1].1, "failed to convert option \"text\": missing required option");
    }

    #[tokio::test]
    async fn tree_checks_run_first() {
        let mut tree = CommandTree::new();
        tree.check(|ctx| async move {
            if ctx.qualified_name == "blocked" {
                Err(Error::from(CommandError::CheckFailure("blocked by tree".into())))
            } else {
                Ok(())
            }
        });
        tree.add_command(noop("blocked"), None, false).unwrap();
        tree.add_command(noop("open"), None, false).unwrap();

        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "blocked", "type": 1}));
        assert!(tree.dispatch(interaction, responder).await.is_err());
        let (interaction, responder) =
            command_interaction(2, json!({"id": "1", "name": "open", "type": 1}));
        assert!(tree.dispatch(interaction, responder).await.is_ok());
    }

    #[tokio::test]
    async fn context_menu_gets_its_target() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let mut tree = CommandTree::new();
        tree.add_command(
            ContextMenu::user("User Info", move |_ctx, target| {
                let sink = sink.clone();
                async move {
                    if let ContextMenuTarget::User(user, _) = target {
                        *sink.lock().unwrap() = Some(user.id);
                    }
                    Ok(())
                }
            }),
            None,
            false,
        )
        .unwrap();

        let (interaction, responder) = command_interaction(
            2,
            json!({
                "id": "1", "name": "User Info", "type": 2, "target_id": "42",
                "resolved": {"users": {"42": crate::types::interaction::tests::user_json("42")}}
            }),
        );
        tree.dispatch(interaction, responder).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(Id::new(42)));
    }

    #[tokio::test]
    async fn autocomplete_caps_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/interactions/\d+/[^/]+/callback$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let http = HttpClient::new(ClientConfig::new("t").with_api_base(server.uri())).unwrap();

        let mut tree = CommandTree::new();
        tree.add_command(
            noop("fruit").parameter(Parameter::string("name", "Fruit").autocomplete(
                |_ctx, partial| async move {
                    Ok::<_, Error>(
                        (0..40)
                            .map(|i| CommandOptionChoice::new(format!("{partial}{i}"), format!("{partial}{i}")))
                            .collect::<Vec<_>>(),
                    )
                },
            )),
            None,
            false,
        )
        .unwrap();

        let interaction: Interaction = serde_json::from_value(interaction_json(
            4,
            json!({"id": "1", "name": "fruit", "type": 1, "options": [
                {"name": "name", "type": 3, "value": "ap", "focused": true}
            ]}),
        ))
        .unwrap();
        let responder = InteractionResponder::new(http, &interaction);
        tree.autocomplete(Arc::new(interaction), responder).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["type"], 8);
        let choices = body["data"]["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 25);
        assert_eq!(choices[0]["name"], "ap0");
    }

    #[tokio::test]
    async fn sync_overwrites_scope() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/applications/77/guilds/9/commands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "100", "application_id": "77", "guild_id": "9", "type": 1,
                 "name": "local", "description": "test command", "version": "1",
                 "default_member_permissions": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let http = HttpClient::new(ClientConfig::new("t").with_api_base(server.uri())).unwrap();

        let mut tree = CommandTree::new();
        tree.add_command(noop("local"), Some(Id::new(9)), false).unwrap();
        let registered = tree.sync(&http, Id::new(77), Some(Id::new(9))).await.unwrap();
        assert_eq!(registered[0].mention().as_deref(), Some("</local:100>"));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body[0]["name"], "local");
    }
}

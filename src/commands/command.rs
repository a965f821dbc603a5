use futures::FutureExt;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use super::args::CommandArgs;
use super::{
    validate_description, validate_name, AutocompleteHandler, Check, CommandContext, CommandError,
    CommandHandler, MAX_OPTIONS,
};
use crate::error::Result;
use crate::types::application::IntegrationType;
use crate::types::channel::ChannelType;
use crate::types::command::{
    ApplicationCommand, CommandOption, CommandOptionChoice, CommandOptionChoiceValue,
    CommandOptionType, CommandType, InteractionContextType, NumberBound,
};
use crate::types::id::{marker::GuildMarker, Id};
use crate::types::permissions::Permissions;

/// One option of a slash command.
#[derive(Clone)]
pub struct Parameter {
    pub(crate) name: String,
    description: String,
    kind: CommandOptionType,
    required: bool,
    choices: Vec<CommandOptionChoice>,
    min_value: Option<NumberBound>,
    max_value: Option<NumberBound>,
    min_length: Option<u16>,
    max_length: Option<u16>,
    channel_types: Vec<ChannelType>,
    pub(crate) autocomplete: Option<AutocompleteHandler>,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}

impl Parameter {
    /// Required by default.
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: CommandOptionType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: true,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            channel_types: Vec::new(),
            autocomplete: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::String)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::Integer)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::Number)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::Boolean)
    }

    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::User)
    }

    pub fn channel(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandOptionType::Channel)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<CommandOptionChoiceValue>) -> Self {
        self.choices.push(CommandOptionChoice::new(name, value));
        self
    }

    pub fn min_value(mut self, min: NumberBound) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: NumberBound) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn min_length(mut self, min: u16) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn channel_types(mut self, types: impl IntoIterator<Item = ChannelType>) -> Self {
        self.channel_types = types.into_iter().collect();
        self
    }

    /// Suggest values while the user types.
    pub fn autocomplete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CommandContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<CommandOptionChoice>>> + Send + 'static,
    {
        self.autocomplete = Some(Arc::new(move |ctx, partial| f(ctx, partial).boxed()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandOptionType {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        let name = self.name.as_str();
        validate_name(name)?;
        validate_description(name, &self.description)?;
        if self.kind.is_subcommand() {
            return Err(CommandError::invalid(name, "subcommands are not parameters"));
        }
        if self.choices.len() > MAX_OPTIONS {
            return Err(CommandError::invalid(
                name,
                format!("at most {MAX_OPTIONS} choices, got {}", self.choices.len()),
            ));
        }
        if !self.choices.is_empty() {
            if self.autocomplete.is_some() {
                return Err(CommandError::invalid(name, "choices and autocomplete are exclusive"));
            }
            if !matches!(
                self.kind,
                CommandOptionType::String | CommandOptionType::Integer | CommandOptionType::Number
            ) {
                return Err(CommandError::invalid(name, "only strings and numbers take choices"));
            }
            for choice in &self.choices {
                let fits = match (&choice.value, self.kind) {
                    (CommandOptionChoiceValue::String(_), CommandOptionType::String) => true,
                    (CommandOptionChoiceValue::Integer(_), CommandOptionType::Integer) => true,
                    (
                        CommandOptionChoiceValue::Integer(_) | CommandOptionChoiceValue::Number(_),
                        CommandOptionType::Number,
                    ) => true,
                    _ => false,
                };
                if !fits {
                    return Err(CommandError::invalid(
                        name,
                        format!("choice {:?} does not match the option type", choice.name),
                    ));
                }
            }
        }
        if self.autocomplete.is_some()
            && !matches!(
                self.kind,
                CommandOptionType::String | CommandOptionType::Integer | CommandOptionType::Number
            )
        {
            return Err(CommandError::invalid(name, "only strings and numbers autocomplete"));
        }
        if (self.min_value.is_some() || self.max_value.is_some()) && !self.kind.is_numeric() {
            return Err(CommandError::invalid(name, "min and max values need a numeric option"));
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min.as_f64() > max.as_f64() {
                return Err(CommandError::invalid(name, "min_value is above max_value"));
            }
        }
        if (self.min_length.is_some() || self.max_length.is_some())
            && self.kind != CommandOptionType::String
        {
            return Err(CommandError::invalid(name, "min and max lengths need a string option"));
        }
        if self.min_length.is_some_and(|min| min > 6000)
            || self.max_length.is_some_and(|max| max == 0 || max > 6000)
        {
            return Err(CommandError::invalid(name, "lengths must be within 0..=6000"));
        }
        if !self.channel_types.is_empty() && self.kind != CommandOptionType::Channel {
            return Err(CommandError::invalid(name, "channel types need a channel option"));
        }
        Ok(())
    }

    pub(crate) fn to_option(&self) -> CommandOption {
        let mut option = CommandOption::new(self.kind, self.name.clone(), self.description.clone());
        option.required = self.required.then_some(true);
        option.choices = (!self.choices.is_empty()).then(|| self.choices.clone());
        option.channel_types = (!self.channel_types.is_empty()).then(|| self.channel_types.clone());
        option.min_value = self.min_value;
        option.max_value = self.max_value;
        option.min_length = self.min_length;
        option.max_length = self.max_length;
        option.autocomplete = self.autocomplete.is_some().then_some(true);
        option
    }
}

/// A slash command, or a subcommand inside a [`Group`](super::Group).
#[derive(Clone)]
pub struct Command {
    pub(crate) name: String,
    description: String,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) handler: CommandHandler,
    pub(crate) checks: Vec<Check>,
    nsfw: bool,
    default_member_permissions: Option<Permissions>,
    contexts: Option<Vec<InteractionContextType>>,
    integration_types: Option<Vec<IntegrationType>>,
    pub(crate) guild: Option<Id<GuildMarker>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            handler: Arc::new(move |ctx| handler(ctx).boxed()),
            checks: Vec::new(),
            nsfw: false,
            default_member_permissions: None,
            contexts: None,
            integration_types: None,
            guild: None,
        }
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
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

    /// Add a prebuilt check, e.g. from [`checks`](super::checks).
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

    /// Register in this guild only.
    pub fn guild(mut self, guild: Id<GuildMarker>) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        validate_name(&self.name)?;
        validate_description(&self.name, &self.description)?;
        if self.parameters.len() > MAX_OPTIONS {
            return Err(CommandError::invalid(
                &self.name,
                format!("at most {MAX_OPTIONS} parameters, got {}", self.parameters.len()),
            ));
        }
        let mut seen = HashSet::new();
        let mut optional_seen = false;
        for parameter in &self.parameters {
            parameter.validate()?;
            if !seen.insert(parameter.name.as_str()) {
                return Err(CommandError::invalid(
                    &self.name,
                    format!("duplicate parameter {:?}", parameter.name),
                ));
            }
            if parameter.required && optional_seen {
                return Err(CommandError::invalid(
                    &self.name,
                    format!("required parameter {:?} follows an optional one", parameter.name),
                ));
            }
            optional_seen |= !parameter.required;
        }
        Ok(())
    }

    /// Confirm required options are present and typed as declared.
    pub(crate) fn check_args(&self, args: &CommandArgs) -> Result<(), CommandError> {
        for parameter in &self.parameters {
            match args.raw(&parameter.name) {
                Some(value) if !CommandArgs::kind_matches(value, parameter.kind) => {
                    return Err(CommandError::transform(
                        &parameter.name,
                        format!("expected {:?}, got {:?}", parameter.kind, value.kind()),
                    ));
                }
                None if parameter.required => {
                    return Err(CommandError::transform(&parameter.name, "missing required option"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn options(&self) -> Vec<CommandOption> {
        self.parameters.iter().map(Parameter::to_option).collect()
    }

    /// As a subcommand option of a group.
    pub(crate) fn to_subcommand(&self) -> CommandOption {
        let mut option = CommandOption::new(
            CommandOptionType::SubCommand,
            self.name.clone(),
            self.description.clone(),
        );
        option.options = Some(self.options());
        option
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(name: &str) -> Command {
        Command::new(name, "does nothing", |_ctx| async { Ok(()) })
    }

    #[test]
    fn payload_shape() {
        let command = noop("roll")
            .parameter(
                Parameter::integer("sides", "Number of sides")
                    .min_value(NumberBound::Integer(2))
                    .max_value(NumberBound::Integer(100)),
            )
            .parameter(
                Parameter::string("label", "Shown with the result")
                    .optional()
                    .max_length(20),
            )
            .nsfw(true);
        command.validate().unwrap();
        assert_eq!(
            serde_json::to_value(command.to_payload()).unwrap(),
            json!({
                "type": 1,
                "name": "roll",
                "description": "does nothing",
                "default_member_permissions": null,
                "nsfw": true,
                "options": [
                    {"type": 4, "name": "sides", "description": "Number of sides", "required": true, "min_value": 2, "max_value": 100},
                    {"type": 3, "name": "label", "description": "Shown with the result", "max_length": 20}
                ]
            })
        );
    }

    #[test]
    fn rejects_invalid_definitions() {
        let invalid = |command: Command| {
            assert!(
                matches!(command.validate(), Err(CommandError::InvalidCommand { .. })),
                "{command:?} should be invalid"
            );
        };

        invalid(noop("Upper"));
        invalid(Command::new("x", "", |_ctx| async { Ok(()) }));
        invalid(
            noop("order")
                .parameter(Parameter::string("a", "a").optional())
                .parameter(Parameter::string("b", "b")),
        );
        invalid(noop("dupe").parameter(Parameter::string("a", "a")).parameter(Parameter::string("a", "a")));
        invalid(noop("bounds").parameter(Parameter::string("s", "s").min_value(NumberBound::Integer(1))));
        invalid(noop("lengths").parameter(Parameter::integer("i", "i").max_length(3)));
        invalid(
            noop("both").parameter(
                Parameter::string("s", "s")
                    .choice("a", "a")
                    .autocomplete(|_ctx, _partial| async { Ok(Vec::new()) }),
            ),
        );
        invalid(noop("mistyped").parameter(Parameter::integer("i", "i").choice("a", "a")));

        let mut many = noop("many");
        for i in 0..26 {
            many = many.parameter(Parameter::string(format!("p{i}"), "p").optional());
        }
        invalid(many);

        let mut choices = Parameter::string("pick", "pick");
        for i in 0..26 {
            choices = choices.choice(format!("c{i}"), format!("c{i}"));
        }
        invalid(noop("choices").parameter(choices));
    }

    #[test]
    fn number_accepts_integer_choices() {
        noop("scale")
            .parameter(Parameter::number("factor", "f").choice("half", 0.5).choice("one", 1i64))
            .validate()
            .unwrap();
    }
}

use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::command::ApplicationCommand;
use crate::types::id::{
    marker::{ApplicationMarker, CommandMarker, GuildMarker},
    Id,
};

/// Global or guild command collection, as a route.
fn collection(
    method: Method,
    application_id: Id<ApplicationMarker>,
    guild_id: Option<Id<GuildMarker>>,
) -> Route {
    match guild_id {
        Some(guild_id) => Route::new(method, "/applications/{application_id}/guilds/{guild_id}/commands")
            .param("application_id", application_id)
            .param("guild_id", guild_id),
        None => Route::new(method, "/applications/{application_id}/commands")
            .param("application_id", application_id),
    }
}

fn single(
    method: Method,
    application_id: Id<ApplicationMarker>,
    guild_id: Option<Id<GuildMarker>>,
    command_id: Id<CommandMarker>,
) -> Route {
    match guild_id {
        Some(guild_id) => Route::new(
            method,
            "/applications/{application_id}/guilds/{guild_id}/commands/{command_id}",
        )
        .param("application_id", application_id)
        .param("guild_id", guild_id),
        None => Route::new(method, "/applications/{application_id}/commands/{command_id}")
            .param("application_id", application_id),
    }
    .param("command_id", command_id)
}

impl HttpClient {
    /// Registered commands, global when `guild_id` is `None`.
    pub async fn commands(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        with_localizations: bool,
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        let mut route = collection(Method::GET, application_id, guild_id);
        if with_localizations {
            route = route.query("with_localizations", true);
        }
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn global_commands(
        &self,
        application_id: Id<ApplicationMarker>,
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        self.commands(application_id, None, false).await
    }

    pub async fn guild_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Id<GuildMarker>,
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        self.commands(application_id, Some(guild_id), false).await
    }

    pub async fn command(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        command_id: Id<CommandMarker>,
    ) -> Result<ApplicationCommand, HttpError> {
        let route = single(Method::GET, application_id, guild_id, command_id);
        self.request_json(&route, &Body::Empty).await
    }

    /// Create or replace a command of the same name and type.
    pub async fn create_command(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        command: &ApplicationCommand,
    ) -> Result<ApplicationCommand, HttpError> {
        let route = collection(Method::POST, application_id, guild_id);
        self.request_json(&route, &Body::json(command)?).await
    }

    pub async fn edit_command(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        command_id: Id<CommandMarker>,
        command: &ApplicationCommand,
    ) -> Result<ApplicationCommand, HttpError> {
        let route = single(Method::PATCH, application_id, guild_id, command_id);
        self.request_json(&route, &Body::json(command)?).await
    }

    pub async fn delete_command(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        command_id: Id<CommandMarker>,
    ) -> Result<(), HttpError> {
        let route = single(Method::DELETE, application_id, guild_id, command_id);
        self.request_empty(&route, &Body::Empty).await
    }

    /// Replace the whole command set in one call.
    pub async fn bulk_overwrite_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Option<Id<GuildMarker>>,
        commands: &[ApplicationCommand],
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        let route = collection(Method::PUT, application_id, guild_id);
        self.request_json(&route, &Body::json(&commands)?).await
    }

    pub async fn bulk_overwrite_global_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        commands: &[ApplicationCommand],
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        self.bulk_overwrite_commands(application_id, None, commands)
            .await
    }

    pub async fn bulk_overwrite_guild_commands(
        &self,
        application_id: Id<ApplicationMarker>,
        guild_id: Id<GuildMarker>,
        commands: &[ApplicationCommand],
    ) -> Result<Vec<ApplicationCommand>, HttpError> {
        self.bulk_overwrite_commands(application_id, Some(guild_id), commands)
            .await
    }
}

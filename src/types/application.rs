//! Application metadata returned by the OAuth2 and application endpoints.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::collections::HashMap;
use url::Url;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::entitlement::{Entitlement, EntitlementQuery};
use crate::types::sku::Sku;
use crate::types::asset::Asset;
use crate::types::id::{
    marker::{ApplicationMarker, GuildMarker, SkuMarker},
    Id,
};
use crate::types::permissions::Permissions;
use crate::types::team::{Team, TeamMember, TeamMembershipState};
use crate::types::user::User;
use crate::types::util::{impl_bitflags_serde, Nullable};

const OAUTH_AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const APP_DIRECTORY_URL: &str = "https://discord.com/application-directory";

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ApplicationFlags: u64 {
        const APPLICATION_AUTO_MODERATION_RULE_CREATE_BADGE = 1 << 6;
        const GATEWAY_PRESENCE = 1 << 12;
        const GATEWAY_PRESENCE_LIMITED = 1 << 13;
        const GATEWAY_GUILD_MEMBERS = 1 << 14;
        const GATEWAY_GUILD_MEMBERS_LIMITED = 1 << 15;
        const VERIFICATION_PENDING_GUILD_LIMIT = 1 << 16;
        const EMBEDDED = 1 << 17;
        const GATEWAY_MESSAGE_CONTENT = 1 << 18;
        const GATEWAY_MESSAGE_CONTENT_LIMITED = 1 << 19;
        const APPLICATION_COMMAND_BADGE = 1 << 23;
    }
}

impl_bitflags_serde!(ApplicationFlags, u64);

/// Where an application can be installed.
#[derive(Clone, Copy, Debug, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum IntegrationType {
    GuildInstall = 0,
    UserInstall = 1,
}

impl IntegrationType {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "0" => Some(Self::GuildInstall),
            "1" => Some(Self::UserInstall),
            _ => None,
        }
    }
}

/// Default scopes and permissions offered by the in-app authorization link.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppInstallParams {
    pub scopes: Vec<String>,
    pub permissions: Permissions,
}

impl AppInstallParams {
    /// The authorization URL a user follows to install the application.
    pub fn oauth_url(&self, client_id: Id<ApplicationMarker>) -> String {
        oauth_url(client_id, &self.scopes, self.permissions, None)
    }
}

/// Build an OAuth2 authorize URL.
///
/// `guild_id` preselects the guild in the dialog.
pub fn oauth_url(
    client_id: Id<ApplicationMarker>,
    scopes: &[String],
    permissions: Permissions,
    guild_id: Option<Id<GuildMarker>>,
) -> String {
    let mut params: Vec<(&str, String)> = vec![("client_id", client_id.to_string())];
    let scope = if scopes.is_empty() {
        "bot applications.commands".to_string()
    } else {
        scopes.join(" ")
    };
    params.push(("scope", scope));
    if !permissions.is_empty() {
        params.push(("permissions", permissions.bits().to_string()));
    }
    if let Some(guild_id) = guild_id {
        params.push(("guild_id", guild_id.to_string()));
        params.push(("disable_guild_select", "true".to_string()));
    }
    match Url::parse_with_params(OAUTH_AUTHORIZE_URL, &params) {
        Ok(url) => url.into(),
        Err(_) => OAUTH_AUTHORIZE_URL.to_string(),
    }
}

/// Per-install-type configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IntegrationTypeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_install_params: Option<AppInstallParams>,
}

/// The full application object for the current bot.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AppInfo {
    pub id: Id<ApplicationMarker>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_origins: Vec<String>,
    #[serde(default)]
    pub bot_public: bool,
    #[serde(default)]
    pub bot_require_code_grant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub verify_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_sku_id: Option<Id<SkuMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_install_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_connections_verification_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions_endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_params: Option<AppInstallParams>,
    #[serde(default)]
    pub flags: ApplicationFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_guild_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_user_install_count: Option<u64>,
    /// Keyed by the stringified [`IntegrationType`] (`"0"`, `"1"`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub integration_types_config: HashMap<String, IntegrationTypeConfig>,
}

impl AppInfo {
    pub fn icon(&self) -> Option<Asset> {
        self.icon
            .as_deref()
            .map(|hash| Asset::application_icon(self.id, hash))
    }

    pub fn cover_image(&self) -> Option<Asset> {
        self.cover_image
            .as_deref()
            .map(|hash| Asset::application_cover(self.id, hash))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Store page of the primary SKU, when the application sells one.
    pub fn primary_sku_url(&self) -> Option<String> {
        let sku = self.primary_sku_id?;
        let slug = self.slug.as_deref().unwrap_or("-");
        Some(format!("{APP_DIRECTORY_URL}/{}/store/{sku}/{slug}", self.id))
    }

    pub async fn fetch_skus(&self, http: &HttpClient) -> Result<Vec<Sku>> {
        Ok(http.skus(self.id).await?)
    }

    /// Entitlements granted by this application, paged until `query.limit`
    /// is reached.
    pub async fn fetch_entitlements(
        &self,
        http: &HttpClient,
        query: &EntitlementQuery,
    ) -> Result<Vec<Entitlement>> {
        Ok(http.entitlements(self.id, query).await?)
    }

    pub fn is_team_owned(&self) -> bool {
        self.team.is_some()
    }

    /// Everyone who owns the application: accepted team members when a team
    /// owns it, otherwise the single owner.
    pub fn owners(&self) -> Vec<&User> {
        match &self.team {
            Some(team) => team
                .members
                .iter()
                .filter(|m| m.membership_state == TeamMembershipState::Accepted)
                .map(|m: &TeamMember| &m.user)
                .collect(),
            None => self.owner.iter().collect(),
        }
    }

    /// Install configuration for one integration type.
    pub fn integration_type_config(&self, kind: IntegrationType) -> Option<&IntegrationTypeConfig> {
        self.integration_types_config
            .iter()
            .find(|(key, _)| IntegrationType::from_key(key) == Some(kind))
            .map(|(_, config)| config)
    }

    /// Custom install URL if configured, else one built from the install
    /// params.
    pub fn install_url(&self) -> Option<String> {
        if let Some(url) = &self.custom_install_url {
            return Some(url.clone());
        }
        self.install_params
            .as_ref()
            .map(|params| params.oauth_url(self.id))
    }
}

/// Public subset of an application (`GET /applications/{id}/rpc`).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PartialAppInfo {
    pub id: Id<ApplicationMarker>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_origins: Vec<String>,
    #[serde(default)]
    pub verify_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions_endpoint_url: Option<String>,
    #[serde(default)]
    pub flags: ApplicationFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_guild_count: Option<u64>,
}

impl PartialAppInfo {
    pub fn icon(&self) -> Option<Asset> {
        self.icon
            .as_deref()
            .map(|hash| Asset::application_icon(self.id, hash))
    }

    pub fn cover_image(&self) -> Option<Asset> {
        self.cover_image
            .as_deref()
            .map(|hash| Asset::application_cover(self.id, hash))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

/// Body of `PATCH /applications/@me`.
///
/// Fields left at [`Nullable::Unchanged`] are not sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EditApplication {
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub description: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub icon: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub cover_image: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub custom_install_url: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub role_connections_verification_url: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub interactions_endpoint_url: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_unchanged")]
    pub install_params: Nullable<AppInstallParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<ApplicationFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl EditApplication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into).into();
        self
    }

    /// Icon as a data URI (`data:image/png;base64,...`), or `None` to remove it.
    pub fn icon(mut self, data_uri: Option<impl Into<String>>) -> Self {
        self.icon = data_uri.map(Into::into).into();
        self
    }

    pub fn cover_image(mut self, data_uri: Option<impl Into<String>>) -> Self {
        self.cover_image = data_uri.map(Into::into).into();
        self
    }

    pub fn custom_install_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.custom_install_url = url.map(Into::into).into();
        self
    }

    pub fn role_connections_verification_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.role_connections_verification_url = url.map(Into::into).into();
        self
    }

    pub fn interactions_endpoint_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.interactions_endpoint_url = url.map(Into::into).into();
        self
    }

    pub fn install_params(mut self, params: Option<AppInstallParams>) -> Self {
        self.install_params = params.into();
        self
    }

    pub fn flags(mut self, flags: ApplicationFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    /// At most five tags of up to 20 characters each.
    ///
    /// # Errors
    ///
    /// Too many or too long tags.
    pub fn tags<I, S>(mut self, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.len() > 5 {
            return Err(Error::InvalidArgument(format!(
                "an application can have at most 5 tags, got {}",
                tags.len()
            )));
        }
        if let Some(tag) = tags.iter().find(|t| t.chars().count() > 20) {
            return Err(Error::InvalidArgument(format!(
                "tag {tag:?} is longer than 20 characters"
            )));
        }
        self.tags = Some(tags);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app_json() -> serde_json::Value {
        json!({
            "id": "172150183260323840",
            "name": "Baba O-Riley",
            "description": "Test",
            "icon": "a_b2b2b2",
            "cover_image": "cccc",
            "bot_public": true,
            "bot_require_code_grant": false,
            "verify_key": "1e0a356058d627ca38a5c8c9648818061d49e49bd9da9e3ab17d98ad4d6bg2u8",
            "primary_sku_id": "172150183260323841",
            "slug": "baba",
            "flags": (1u64 << 12) | (1u64 << 40),
            "owner": {
                "id": "172150183260323840",
                "username": "i own a bot",
                "discriminator": "1738",
                "avatar": null
            },
            "team": null,
            "install_params": {
                "scopes": ["bot", "applications.commands"],
                "permissions": "2048"
            },
            "integration_types_config": {
                "0": { "oauth2_install_params": { "scopes": ["bot"], "permissions": "0" } },
                "1": {}
            }
        })
    }

    #[test]
    fn deserializes_full_payload() {
        let app: AppInfo = serde_json::from_value(app_json()).unwrap();
        assert_eq!(app.name, "Baba O-Riley");
        assert!(app.bot_public);
        assert!(app.flags.contains(ApplicationFlags::GATEWAY_PRESENCE));
        assert_eq!(app.flags.bits() & (1 << 40), 1 << 40);
        assert!(!app.is_team_owned());
        assert_eq!(app.owners().len(), 1);
        assert!(app.icon().unwrap().is_animated());
        assert!(app
            .integration_type_config(IntegrationType::GuildInstall)
            .and_then(|c| c.oauth2_install_params.as_ref())
            .is_some());
        assert!(app
            .integration_type_config(IntegrationType::UserInstall)
            .unwrap()
            .oauth2_install_params
            .is_none());
    }

    #[test]
    fn primary_sku_url_uses_slug() {
        let app: AppInfo = serde_json::from_value(app_json()).unwrap();
        assert_eq!(
            app.primary_sku_url().as_deref(),
            Some("https://discord.com/application-directory/172150183260323840/store/172150183260323841/baba")
        );
    }

    #[test]
    fn team_owned_lists_accepted_members() {
        let mut value = app_json();
        value["team"] = json!({
            "id": "1",
            "name": "t",
            "icon": null,
            "owner_user_id": "2",
            "members": [
                {"membership_state": 2, "team_id": "1", "role": "admin",
                 "user": {"id": "2", "username": "a", "discriminator": "0", "avatar": null}},
                {"membership_state": 1, "team_id": "1", "role": "developer",
                 "user": {"id": "3", "username": "b", "discriminator": "0", "avatar": null}}
            ]
        });
        let app: AppInfo = serde_json::from_value(value).unwrap();
        assert!(app.is_team_owned());
        let owners: Vec<_> = app.owners().iter().map(|u| u.name.clone()).collect();
        assert_eq!(owners, vec!["a"]);
    }

    #[test]
    fn install_params_oauth_url() {
        let app: AppInfo = serde_json::from_value(app_json()).unwrap();
        let url = app.install_url().unwrap();
        assert!(url.starts_with("https://discord.com/oauth2/authorize?client_id=172150183260323840"));
        assert!(url.contains("scope=bot+applications.commands"));
        assert!(url.contains("permissions=2048"));
    }

    #[test]
    fn oauth_url_with_guild() {
        let url = oauth_url(Id::new(5), &[], Permissions::empty(), Some(Id::new(9)));
        assert_eq!(
            url,
            "https://discord.com/oauth2/authorize?client_id=5&scope=bot+applications.commands&guild_id=9&disable_guild_select=true"
        );
    }

    #[test]
    fn edit_application_omits_unchanged() {
        let edit = EditApplication::new()
            .description(Some("new"))
            .icon(None::<String>);
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({"description": "new", "icon": null})
        );
    }

    #[test]
    fn edit_application_tag_limits() {
        assert!(EditApplication::new().tags(["a", "b", "c", "d", "e", "f"]).is_err());
        assert!(EditApplication::new().tags(["x".repeat(21)]).is_err());
        let edit = EditApplication::new().tags(["music"]).unwrap();
        assert_eq!(serde_json::to_value(&edit).unwrap(), json!({"tags": ["music"]}));
    }

    #[test]
    fn partial_app_info() {
        let info: PartialAppInfo = serde_json::from_value(json!({
            "id": "172150183260323840",
            "name": "rpc",
            "icon": null,
            "verify_key": "k",
            "flags": 0
        }))
        .unwrap();
        assert!(info.icon().is_none());
        assert_eq!(info.description, "");
    }
}

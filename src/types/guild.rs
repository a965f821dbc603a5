//! Guilds, members and roles, as far as interactions need them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::asset::Asset;
use crate::types::id::{
    marker::{GuildMarker, RoleMarker, UserMarker},
    Id,
};
use crate::types::permissions::Permissions;
use crate::types::user::User;

/// Guild summary attached to interactions and gateway payloads.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PartialGuild {
    pub id: Id<GuildMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Guild {
    pub id: Id<GuildMarker>,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id<UserMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_presence_count: Option<u64>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<String>,
}

impl Guild {
    pub fn icon(&self) -> Option<Asset> {
        self.icon.as_deref().map(|hash| Asset::guild_icon(self.id, hash))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Best available member count.
    pub fn member_count(&self) -> Option<u64> {
        self.member_count.or(self.approximate_member_count)
    }

    pub fn role(&self, id: Id<RoleMarker>) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }
}

/// Guild sent as unavailable in READY before its GUILD_CREATE arrives.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UnavailableGuild {
    pub id: Id<GuildMarker>,
    #[serde(default)]
    pub unavailable: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Role {
    pub id: Id<RoleMarker>,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub position: i64,
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// `<@&id>`.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// A guild member.
///
/// In interaction payloads `user` is always present and `permissions`
/// holds the member's computed permissions in the invoking channel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<Id<RoleMarker>>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
}

impl Member {
    /// Nickname, else the user's display name.
    pub fn display_name(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or_else(|| self.user.as_ref().map(User::display_name))
    }

    pub fn has_role(&self, role: Id<RoleMarker>) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_display_name() {
        let member: Member = serde_json::from_value(json!({
            "user": {"id": "1", "username": "name", "global_name": "Global", "discriminator": "0", "avatar": null},
            "nick": null,
            "roles": ["10"],
            "joined_at": "2021-01-01T00:00:00+00:00",
            "permissions": "2048",
            "deaf": false,
            "mute": false
        }))
        .unwrap();
        assert_eq!(member.display_name(), Some("Global"));
        assert!(member.has_role(Id::new(10)));
        assert_eq!(member.permissions, Some(Permissions::SEND_MESSAGES));
    }

    #[test]
    fn guild_icon_and_counts() {
        let guild: Guild = serde_json::from_value(json!({
            "id": "197038439483310086",
            "name": "Cordial",
            "icon": "a_1269e74af4df7417b13759eae50c83dc",
            "approximate_member_count": 42,
            "roles": [{"id": "5", "name": "mod", "permissions": "8"}]
        }))
        .unwrap();
        assert!(guild.icon().unwrap().is_animated());
        assert_eq!(guild.member_count(), Some(42));
        assert_eq!(guild.role(Id::new(5)).unwrap().mention(), "<@&5>");
        assert!(guild.role(Id::new(5)).unwrap().permissions.contains(Permissions::ADMINISTRATOR));
    }
}

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::asset::Asset;
use crate::types::id::{marker::UserMarker, Id};
use crate::types::util::impl_bitflags_serde;

bitflags! {
    /// Public badges on a user's profile.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct UserFlags: u64 {
        const STAFF = 1 << 0;
        const PARTNER = 1 << 1;
        const HYPESQUAD = 1 << 2;
        const BUG_HUNTER_LEVEL_1 = 1 << 3;
        const HYPESQUAD_ONLINE_HOUSE_1 = 1 << 6;
        const HYPESQUAD_ONLINE_HOUSE_2 = 1 << 7;
        const HYPESQUAD_ONLINE_HOUSE_3 = 1 << 8;
        const PREMIUM_EARLY_SUPPORTER = 1 << 9;
        const TEAM_PSEUDO_USER = 1 << 10;
        const BUG_HUNTER_LEVEL_2 = 1 << 14;
        const VERIFIED_BOT = 1 << 16;
        const VERIFIED_DEVELOPER = 1 << 17;
        const CERTIFIED_MODERATOR = 1 << 18;
        const BOT_HTTP_INTERACTIONS = 1 << 19;
        const ACTIVE_DEVELOPER = 1 << 22;
    }
}

impl_bitflags_serde!(UserFlags, u64);

/// A Discord user.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    #[serde(rename = "username")]
    pub name: String,
    /// `0` for users on the unique-username system.
    #[serde(with = "discriminator", default)]
    pub discriminator: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_flags: Option<UserFlags>,
}

impl User {
    /// Global display name if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.name)
    }

    /// `<@id>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// `name#0001`, or just `name` for migrated accounts.
    pub fn tag(&self) -> String {
        if self.discriminator == 0 {
            self.name.clone()
        } else {
            format!("{}#{:04}", self.name, self.discriminator)
        }
    }

    /// Uploaded avatar, if any.
    pub fn avatar(&self) -> Option<Asset> {
        self.avatar
            .as_deref()
            .map(|hash| Asset::user_avatar(self.id, hash))
    }

    pub fn default_avatar(&self) -> Asset {
        Asset::default_avatar(self.id, self.discriminator)
    }

    /// The avatar clients actually render.
    pub fn display_avatar(&self) -> Asset {
        self.avatar().unwrap_or_else(|| self.default_avatar())
    }

    pub fn banner(&self) -> Option<Asset> {
        self.banner
            .as_deref()
            .map(|hash| Asset::user_banner(self.id, hash))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    pub fn flags(&self) -> UserFlags {
        self.public_flags.unwrap_or_default()
    }
}

/// Discriminators arrive as zero-padded strings (`"0001"`).
mod discriminator {
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{value:04}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(u16),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s.parse().map_err(DeError::custom),
            Raw::Num(n) => Ok(n),
        }
    }
}

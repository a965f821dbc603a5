use serde::{Deserialize, Serialize};

use crate::types::id::{
    marker::{ChannelMarker, GuildMarker},
    Id,
};
use crate::types::permissions::Permissions;
use crate::types::util::open_enum;

open_enum! {
    pub enum ChannelType {
        GuildText = 0,
        Dm = 1,
        GuildVoice = 2,
        GroupDm = 3,
        GuildCategory = 4,
        GuildAnnouncement = 5,
        AnnouncementThread = 10,
        PublicThread = 11,
        PrivateThread = 12,
        GuildStageVoice = 13,
        GuildDirectory = 14,
        GuildForum = 15,
        GuildMedia = 16,
    }
}

impl ChannelType {
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }

    pub fn is_private(self) -> bool {
        matches!(self, Self::Dm | Self::GroupDm)
    }
}

/// A channel. Resolved interaction data only carries a subset of fields,
/// hence the many defaults.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Channel {
    pub id: Id<ChannelMarker>,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id<ChannelMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    /// The invoking member's permissions, present on resolved channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

impl Channel {
    /// `<#id>`.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolved_channel() {
        let channel: Channel = serde_json::from_value(json!({
            "id": "41771983423143937",
            "type": 11,
            "name": "thread",
            "parent_id": "41771983423143936",
            "permissions": "1024"
        }))
        .unwrap();
        assert!(channel.kind.is_thread());
        assert!(!channel.kind.is_private());
        assert_eq!(channel.mention(), "<#41771983423143937>");
        assert_eq!(channel.permissions, Some(Permissions::VIEW_CHANNEL));
    }
}

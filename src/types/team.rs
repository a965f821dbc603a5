use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::types::asset::Asset;
use crate::types::id::{
    marker::{TeamMarker, UserMarker},
    Id,
};
use crate::types::user::User;

/// A developer team that owns one or more applications.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: Id<TeamMarker>,
    pub name: String,
    pub icon: Option<String>,
    pub owner_user_id: Id<UserMarker>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl Team {
    pub fn icon(&self) -> Option<Asset> {
        self.icon.as_deref().map(|hash| Asset::team_icon(self.id, hash))
    }

    /// The owning member, if present in `members`.
    pub fn owner(&self) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|member| member.user.id == self.owner_user_id)
    }

    /// Members that accepted their invite.
    pub fn accepted_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.members
            .iter()
            .filter(|member| member.membership_state == TeamMembershipState::Accepted)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub membership_state: TeamMembershipState,
    pub team_id: Id<TeamMarker>,
    pub user: User,
    #[serde(default)]
    pub role: TeamMemberRole,
}

#[derive(Clone, Copy, Debug, Deserialize_repr, Eq, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum TeamMembershipState {
    Invited = 1,
    Accepted = 2,
}

/// Team role. The owner is not a role; compare against
/// [`Team::owner_user_id`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMemberRole {
    Admin,
    Developer,
    #[default]
    ReadOnly,
    #[serde(untagged)]
    Unknown(String),
}

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{
    marker::{ApplicationMarker, SkuMarker},
    Id,
};
use crate::types::util::{impl_bitflags_serde, open_enum};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct SkuFlags: u64 {
        const AVAILABLE = 1 << 2;
        const GUILD_SUBSCRIPTION = 1 << 7;
        const USER_SUBSCRIPTION = 1 << 8;
    }
}

impl_bitflags_serde!(SkuFlags, u64);

open_enum! {
    pub enum SkuType {
        Durable = 2,
        Consumable = 3,
        Subscription = 5,
        /// System-generated group a subscription SKU belongs to.
        SubscriptionGroup = 6,
    }
}

/// A premium offering sold by an application.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Sku {
    pub id: Id<SkuMarker>,
    #[serde(rename = "type")]
    pub kind: SkuType,
    pub application_id: Id<ApplicationMarker>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub flags: SkuFlags,
}

impl Sku {
    /// Store page of this SKU in the application directory.
    pub fn url(&self) -> String {
        format!(
            "https://discord.com/application-directory/{}/store/{}",
            self.application_id, self.id
        )
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    pub fn is_available(&self) -> bool {
        self.flags.contains(SkuFlags::AVAILABLE)
    }

    pub fn is_subscription(&self) -> bool {
        matches!(self.kind, SkuType::Subscription | SkuType::SubscriptionGroup)
    }

    pub fn is_consumable(&self) -> bool {
        self.kind == SkuType::Consumable
    }
}

//! Gift codes that grant an entitlement when redeemed.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::entitlement::Entitlement;
use crate::types::id::{
    marker::{ApplicationMarker, ChannelMarker, GiftBatchMarker, SkuMarker, SubscriptionPlanMarker},
    Id,
};
use crate::types::user::User;
use crate::types::util::impl_bitflags_serde;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct GiftFlags: u64 {
        const PAYMENT_SOURCE_REQUIRED = 1 << 0;
        const EXISTING_SUBSCRIPTION_DISALLOWED = 1 << 1;
        const NOT_SELF_REDEEMABLE = 1 << 2;
        const PROMOTION = 1 << 3;
    }
}

impl_bitflags_serde!(GiftFlags, u64);

/// Wrapping shown when the gift is opened.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "u8", into = "u8")]
pub enum GiftStyle {
    Snowglobe,
    Box,
    Cup,
    Unknown(u8),
}

impl From<u8> for GiftStyle {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Snowglobe,
            2 => Self::Box,
            3 => Self::Cup,
            other => Self::Unknown(other),
        }
    }
}

impl From<GiftStyle> for u8 {
    fn from(value: GiftStyle) -> Self {
        match value {
            GiftStyle::Snowglobe => 1,
            GiftStyle::Box => 2,
            GiftStyle::Cup => 3,
            GiftStyle::Unknown(other) => other,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Gift {
    pub code: String,
    pub sku_id: Id<SkuMarker>,
    pub application_id: Id<ApplicationMarker>,
    #[serde(default)]
    pub uses: u32,
    #[serde(default)]
    pub max_uses: u32,
    #[serde(default)]
    pub redeemed: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// The gifter, when visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Id<GiftBatchMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_plan_id: Option<Id<SubscriptionPlanMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_style: Option<GiftStyle>,
    #[serde(default)]
    pub flags: GiftFlags,
}

fn gift_url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.)?(?:discord\.gift/|(?:canary\.|ptb\.)?discord(?:app)?\.com/gifts/)([A-Za-z0-9-]+)/?(?:[?#].*)?$",
        )
        .ok()
    })
    .as_ref()
}

impl Gift {
    /// Extract the code from a gift link, or accept a bare code.
    pub fn parse_code(input: &str) -> Option<String> {
        let input = input.trim();
        if let Some(captures) = gift_url_regex().and_then(|re| re.captures(input)) {
            return captures.get(1).map(|m| m.as_str().to_string());
        }
        let bare = !input.is_empty()
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        bare.then(|| input.to_string())
    }

    /// Look a gift up by code or link.
    pub async fn fetch(http: &HttpClient, code: &str) -> Result<Self> {
        let code = Self::parse_code(code)
            .ok_or_else(|| Error::InvalidArgument(format!("{code:?} is not a gift code")))?;
        Ok(http.gift(&code, true).await?)
    }

    pub fn url(&self) -> String {
        format!("https://discord.gift/{}", self.code)
    }

    /// `None` for unlimited gifts.
    pub fn remaining_uses(&self) -> Option<u32> {
        (self.max_uses > 0).then(|| self.max_uses.saturating_sub(self.uses))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        !self.redeemed && !self.is_expired_at(now) && self.remaining_uses() != Some(0)
    }

    /// Redeem this gift for the current user.
    ///
    /// `channel` is the channel the gift was posted in, if any.
    pub async fn redeem(
        &self,
        http: &HttpClient,
        channel: Option<Id<ChannelMarker>>,
    ) -> Result<Entitlement> {
        Ok(http.redeem_gift(&self.code, channel).await?)
    }
}

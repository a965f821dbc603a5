//! Entitlements record that a user or guild has access to a SKU.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::gift::GiftFlags;
use crate::types::id::{
    marker::{ApplicationMarker, EntitlementMarker, GuildMarker, SkuMarker, UserMarker},
    Id,
};
use crate::types::util::open_enum;

/// Page size cap of `GET /applications/{id}/entitlements`.
pub const MAX_ENTITLEMENTS_PER_PAGE: u8 = 100;

open_enum! {
    pub enum EntitlementType {
        Purchase = 1,
        PremiumSubscription = 2,
        DeveloperGift = 3,
        TestModePurchase = 4,
        FreePurchase = 5,
        UserGift = 6,
        PremiumPurchase = 7,
        ApplicationSubscription = 8,
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Entitlement {
    pub id: Id<EntitlementMarker>,
    pub sku_id: Id<SkuMarker>,
    pub application_id: Id<ApplicationMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id<UserMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(rename = "type")]
    pub kind: EntitlementType,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub consumed: bool,
    #[serde(default)]
    pub gift_code_flags: GiftFlags,
}

impl Entitlement {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Whether the entitlement has an end date at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|ends| ends <= now)
    }

    /// Not deleted, already started, and not expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.deleted
            && self.starts_at.map_or(true, |starts| starts <= now)
            && !self.is_expired_at(now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_test(&self) -> bool {
        self.kind == EntitlementType::TestModePurchase
    }

    /// Mark a one-time purchase as used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without a request if the
    /// entitlement is already consumed, otherwise any HTTP failure.
    pub async fn consume(&mut self, http: &HttpClient) -> Result<()> {
        if self.consumed {
            return Err(Error::InvalidArgument(format!(
                "entitlement {} is already consumed",
                self.id
            )));
        }
        http.consume_entitlement(self.application_id, self.id).await?;
        self.consumed = true;
        Ok(())
    }

    /// Delete a test entitlement.
    ///
    /// # Errors
    ///
    /// Only test entitlements can be deleted.
    pub async fn delete(&self, http: &HttpClient) -> Result<()> {
        if !self.is_test() {
            return Err(Error::InvalidArgument(format!(
                "entitlement {} is not a test entitlement",
                self.id
            )));
        }
        http.delete_test_entitlement(self.application_id, self.id)
            .await?;
        Ok(())
    }
}

/// Who a test entitlement is granted to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TestEntitlementOwner {
    Guild(Id<GuildMarker>),
    User(Id<UserMarker>),
}

impl TestEntitlementOwner {
    pub fn owner_id(self) -> u64 {
        match self {
            Self::Guild(id) => id.get(),
            Self::User(id) => id.get(),
        }
    }

    pub fn owner_type(self) -> u8 {
        match self {
            Self::Guild(_) => 1,
            Self::User(_) => 2,
        }
    }
}

/// Body of `POST /applications/{id}/entitlements`.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct CreateTestEntitlement {
    pub sku_id: Id<SkuMarker>,
    #[serde(with = "owner_id_string")]
    pub owner_id: u64,
    pub owner_type: u8,
}

impl CreateTestEntitlement {
    pub fn new(sku_id: Id<SkuMarker>, owner: TestEntitlementOwner) -> Self {
        Self {
            sku_id,
            owner_id: owner.owner_id(),
            owner_type: owner.owner_type(),
        }
    }
}

mod owner_id_string {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}

/// Filter for listing entitlements.
///
/// `limit` is the total number wanted; the list helper pages through
/// results 100 at a time until it has that many.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitlementQuery {
    pub user_id: Option<Id<UserMarker>>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub sku_ids: Vec<Id<SkuMarker>>,
    pub before: Option<Id<EntitlementMarker>>,
    pub after: Option<Id<EntitlementMarker>>,
    pub limit: Option<usize>,
    pub exclude_ended: bool,
    pub exclude_deleted: bool,
}

impl EntitlementQuery {
    pub fn new() -> Self {
        Self {
            exclude_deleted: true,
            ..Self::default()
        }
    }

    pub fn user(mut self, user_id: Id<UserMarker>) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn guild(mut self, guild_id: Id<GuildMarker>) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn skus(mut self, sku_ids: impl IntoIterator<Item = Id<SkuMarker>>) -> Self {
        self.sku_ids = sku_ids.into_iter().collect();
        self
    }

    pub fn before(mut self, id: Id<EntitlementMarker>) -> Self {
        self.before = Some(id);
        self
    }

    pub fn after(mut self, id: Id<EntitlementMarker>) -> Self {
        self.after = Some(id);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn exclude_ended(mut self, exclude: bool) -> Self {
        self.exclude_ended = exclude;
        self
    }

    pub fn exclude_deleted(mut self, exclude: bool) -> Self {
        self.exclude_deleted = exclude;
        self
    }

    /// Query pairs for one page of at most `page_limit` results.
    pub(crate) fn page_params(&self, page_limit: u8) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user_id) = self.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if let Some(guild_id) = self.guild_id {
            params.push(("guild_id", guild_id.to_string()));
        }
        if !self.sku_ids.is_empty() {
            let ids: Vec<String> = self.sku_ids.iter().map(ToString::to_string).collect();
            params.push(("sku_ids", ids.join(",")));
        }
        if let Some(before) = self.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = self.after {
            params.push(("after", after.to_string()));
        }
        params.push(("limit", page_limit.to_string()));
        if self.exclude_ended {
            params.push(("exclude_ended", "true".to_string()));
        }
        if !self.exclude_deleted {
            params.push(("exclude_deleted", "false".to_string()));
        }
        params
    }
}

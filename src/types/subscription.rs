use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{
    marker::{EntitlementMarker, SkuMarker, SubscriptionMarker, UserMarker},
    Id,
};
use crate::types::util::open_enum;

open_enum! {
    pub enum SubscriptionStatus {
        Active = 0,
        /// Active, but will not renew.
        Ending = 1,
        Inactive = 2,
    }
}

/// A user's recurring payment for one or more SKUs.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Subscription {
    pub id: Id<SubscriptionMarker>,
    pub user_id: Id<UserMarker>,
    #[serde(default)]
    pub sku_ids: Vec<Id<SkuMarker>>,
    #[serde(default)]
    pub entitlement_ids: Vec<Id<EntitlementMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_sku_ids: Option<Vec<Id<SkuMarker>>>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    /// Only present when fetched with the `applications.entitlements` scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Subscription {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// Time left in the current billing period, zero once it is over.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.current_period_end - now).max(Duration::zero())
    }
}

/// Filter for `GET /skus/{sku_id}/subscriptions`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionQuery {
    pub user_id: Option<Id<UserMarker>>,
    pub before: Option<Id<SubscriptionMarker>>,
    pub after: Option<Id<SubscriptionMarker>>,
    pub limit: Option<u8>,
}

impl SubscriptionQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user_id) = self.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if let Some(before) = self.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = self.after {
            params.push(("after", after.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.clamp(1, 100).to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn subscription(status: u8, canceled_at: Option<&str>) -> Subscription {
        serde_json::from_value(json!({
            "id": "1278078770116427839",
            "user_id": "1088605110638227537",
            "sku_ids": ["1158857122189168803"],
            "entitlement_ids": [],
            "renewal_sku_ids": null,
            "current_period_start": "2024-08-27T19:48:44.406602+00:00",
            "current_period_end": "2024-09-27T19:48:44.406602+00:00",
            "status": status,
            "canceled_at": canceled_at,
        }))
        .unwrap()
    }

    #[test]
    fn active_subscription() {
        let sub = subscription(0, None);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(!sub.is_canceled());
        assert!(sub.renewal_sku_ids.is_none());
        assert!(sub.country.is_none());
    }

    #[test]
    fn remaining_time() {
        let sub = subscription(1, Some("2024-09-01T00:00:00+00:00"));
        assert!(sub.is_canceled());
        let now = Utc.with_ymd_and_hms(2024, 9, 26, 19, 48, 44).unwrap();
        let left = sub.remaining_at(now);
        assert!(left > Duration::hours(23) && left < Duration::hours(25));
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(sub.remaining_at(later), Duration::zero());
    }

    #[test]
    fn query_clamps_limit() {
        let query = SubscriptionQuery {
            user_id: Some(Id::new(7)),
            limit: Some(250),
            ..SubscriptionQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![("user_id", "7".to_string()), ("limit", "100".to_string())]
        );
    }

    #[test]
    fn unknown_status_is_kept() {
        let sub = subscription(7, None);
        assert_eq!(sub.status, SubscriptionStatus::Unknown(7));
        assert_eq!(serde_json::to_value(sub.status).unwrap(), json!(7));
    }
}

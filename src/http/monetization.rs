use reqwest::Method;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::entitlement::{
    CreateTestEntitlement, Entitlement, EntitlementQuery, TestEntitlementOwner,
    MAX_ENTITLEMENTS_PER_PAGE,
};
use crate::types::id::{
    marker::{ApplicationMarker, EntitlementMarker, SkuMarker, SubscriptionMarker},
    Id,
};
use crate::types::sku::Sku;
use crate::types::subscription::{Subscription, SubscriptionQuery};

impl HttpClient {
    pub async fn skus(&self, application_id: Id<ApplicationMarker>) -> Result<Vec<Sku>, HttpError> {
        let route = Route::new(Method::GET, "/applications/{application_id}/skus")
            .param("application_id", application_id);
        self.request_json(&route, &Body::Empty).await
    }

    /// One page of entitlements, at most 100.
    pub async fn entitlements_page(
        &self,
        application_id: Id<ApplicationMarker>,
        query: &EntitlementQuery,
        page_limit: u8,
    ) -> Result<Vec<Entitlement>, HttpError> {
        let route = Route::new(Method::GET, "/applications/{application_id}/entitlements")
            .param("application_id", application_id)
            .query_pairs(query.page_params(page_limit.clamp(1, MAX_ENTITLEMENTS_PER_PAGE)));
        self.request_json(&route, &Body::Empty).await
    }

    /// Every entitlement matching `query`, paging until `query.limit` is
    /// reached or the results run out.
    ///
    /// With `after` set, pages walk forward from that id; otherwise they
    /// walk backward from `before` (or the newest entitlement).
    pub async fn entitlements(
        &self,
        application_id: Id<ApplicationMarker>,
        query: &EntitlementQuery,
    ) -> Result<Vec<Entitlement>, HttpError> {
        let mut query = query.clone();
        let forward = query.after.is_some();
        let mut out = Vec::new();

        loop {
            let wanted = query.limit.map(|limit| limit.saturating_sub(out.len()));
            if wanted == Some(0) {
                break;
            }
            let page_limit = wanted.map_or(MAX_ENTITLEMENTS_PER_PAGE, |w| {
                w.min(usize::from(MAX_ENTITLEMENTS_PER_PAGE)) as u8
            });

            let page = self
                .entitlements_page(application_id, &query, page_limit)
                .await?;
            let exhausted = page.len() < usize::from(page_limit);

            if forward {
                query.after = page.iter().map(|e| e.id).max();
            } else {
                query.before = page.iter().map(|e| e.id).min();
            }
            out.extend(page);

            if exhausted {
                break;
            }
        }

        if let Some(limit) = query.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    pub async fn entitlement(
        &self,
        application_id: Id<ApplicationMarker>,
        entitlement_id: Id<EntitlementMarker>,
    ) -> Result<Entitlement, HttpError> {
        let route = Route::new(
            Method::GET,
            "/applications/{application_id}/entitlements/{entitlement_id}",
        )
        .param("application_id", application_id)
        .param("entitlement_id", entitlement_id);
        self.request_json(&route, &Body::Empty).await
    }

    /// Mark a one-time purchase as used.
    pub async fn consume_entitlement(
        &self,
        application_id: Id<ApplicationMarker>,
        entitlement_id: Id<EntitlementMarker>,
    ) -> Result<(), HttpError> {
        let route = Route::new(
            Method::POST,
            "/applications/{application_id}/entitlements/{entitlement_id}/consume",
        )
        .param("application_id", application_id)
        .param("entitlement_id", entitlement_id);
        self.request_empty(&route, &Body::Empty).await
    }

    /// Grant a free test entitlement to a user or guild.
    pub async fn create_test_entitlement(
        &self,
        application_id: Id<ApplicationMarker>,
        sku_id: Id<SkuMarker>,
        owner: TestEntitlementOwner,
    ) -> Result<Entitlement, HttpError> {
        let route = Route::new(Method::POST, "/applications/{application_id}/entitlements")
            .param("application_id", application_id);
        let body = Body::json(&CreateTestEntitlement::new(sku_id, owner))?;
        self.request_json(&route, &body).await
    }

    pub async fn delete_test_entitlement(
        &self,
        application_id: Id<ApplicationMarker>,
        entitlement_id: Id<EntitlementMarker>,
    ) -> Result<(), HttpError> {
        let route = Route::new(
            Method::DELETE,
            "/applications/{application_id}/entitlements/{entitlement_id}",
        )
        .param("application_id", application_id)
        .param("entitlement_id", entitlement_id);
        self.request_empty(&route, &Body::Empty).await
    }

    pub async fn sku_subscriptions(
        &self,
        sku_id: Id<SkuMarker>,
        query: &SubscriptionQuery,
    ) -> Result<Vec<Subscription>, HttpError> {
        let route = Route::new(Method::GET, "/skus/{sku_id}/subscriptions")
            .param("sku_id", sku_id)
            .query_pairs(query.params());
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn sku_subscription(
        &self,
        sku_id: Id<SkuMarker>,
        subscription_id: Id<SubscriptionMarker>,
    ) -> Result<Subscription, HttpError> {
        let route = Route::new(Method::GET, "/skus/{sku_id}/subscriptions/{subscription_id}")
            .param("sku_id", sku_id)
            .param("subscription_id", subscription_id);
        self.request_json(&route, &Body::Empty).await
    }
}

use reqwest::Method;
use serde_json::json;

use super::{Body, HttpClient, Route};
use crate::error::HttpError;
use crate::types::entitlement::Entitlement;
use crate::types::gift::Gift;
use crate::types::id::{
    marker::{ChannelMarker, PaymentMarker},
    Id,
};
use crate::types::payment::Payment;

impl HttpClient {
    /// Look a gift up by its bare code.
    pub async fn gift(&self, code: &str, with_application: bool) -> Result<Gift, HttpError> {
        let route = Route::new(Method::GET, "/entitlements/gift-codes/{code}")
            .param("code", code)
            .query("with_application", with_application)
            .query("with_subscription_plan", true);
        self.request_json(&route, &Body::Empty).await
    }

    /// Redeem a gift for the current user.
    pub async fn redeem_gift(
        &self,
        code: &str,
        channel_id: Option<Id<ChannelMarker>>,
    ) -> Result<Entitlement, HttpError> {
        let route = Route::new(Method::POST, "/entitlements/gift-codes/{code}/redeem")
            .param("code", code);
        let body = Body::Json(json!({ "channel_id": channel_id }));
        self.request_json(&route, &body).await
    }

    /// The current user's payments, newest first.
    pub async fn payments(&self, limit: Option<u8>) -> Result<Vec<Payment>, HttpError> {
        let mut route = Route::new(Method::GET, "/users/@me/billing/payments");
        if let Some(limit) = limit {
            route = route.query("limit", limit.clamp(1, 100));
        }
        self.request_json(&route, &Body::Empty).await
    }

    pub async fn payment(&self, payment_id: Id<PaymentMarker>) -> Result<Payment, HttpError> {
        let route = Route::new(Method::GET, "/users/@me/billing/payments/{payment_id}")
            .param("payment_id", payment_id);
        self.request_json(&route, &Body::Empty).await
    }
}

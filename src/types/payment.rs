use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::id::{
    marker::{PaymentMarker, SkuMarker},
    Id,
};
use crate::types::util::{impl_bitflags_serde, open_enum};

/// Currencies Discord bills without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["jpy", "krw", "vnd", "clp", "isk", "huf", "twd"];

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct PaymentFlags: u64 {
        const GIFT = 1 << 0;
        const PREORDER = 1 << 3;
        const TEMPORARY_AUTHORIZATION = 1 << 5;
        const UNSEEN = 1 << 6;
    }
}

impl_bitflags_serde!(PaymentFlags, u64);

open_enum! {
    pub enum PaymentStatus {
        Pending = 0,
        Completed = 1,
        Failed = 2,
        Reversed = 3,
        Refunded = 4,
        Canceled = 5,
    }
}

open_enum! {
    /// Processor a payment went through.
    pub enum PaymentGateway {
        Stripe = 1,
        Braintree = 2,
        Apple = 3,
        Google = 4,
        Adyen = 5,
        AppleAppStore = 6,
    }
}

/// A charge on the current user's account.
///
/// Amounts are in the currency's smallest unit (cents for USD).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payment {
    pub id: Id<PaymentMarker>,
    pub amount: u64,
    #[serde(default)]
    pub amount_refunded: u64,
    #[serde(default)]
    pub tax: u64,
    #[serde(default)]
    pub tax_inclusive: bool,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<Id<SkuMarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_gateway: Option<PaymentGateway>,
    #[serde(default)]
    pub flags: PaymentFlags,
}

/// The current user's payments, newest first. `limit` is clamped to 1..=100.
pub async fn fetch_payments(http: &HttpClient, limit: Option<u8>) -> Result<Vec<Payment>> {
    Ok(http.payments(limit).await?)
}

pub async fn fetch_payment(http: &HttpClient, payment_id: Id<PaymentMarker>) -> Result<Payment> {
    Ok(http.payment(payment_id).await?)
}

impl Payment {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    pub fn is_refunded(&self) -> bool {
        self.status == PaymentStatus::Refunded
            || (self.amount_refunded > 0 && self.amount_refunded >= self.amount)
    }

    pub fn is_partially_refunded(&self) -> bool {
        self.amount_refunded > 0 && self.amount_refunded < self.amount
    }

    pub fn is_gift(&self) -> bool {
        self.flags.contains(PaymentFlags::GIFT)
    }

    /// Amount kept after refunds.
    pub fn net_amount(&self) -> u64 {
        self.amount.saturating_sub(self.amount_refunded)
    }

    /// Human readable amount, e.g. `12.99 USD` or `1200 JPY`.
    pub fn display_amount(&self) -> String {
        format_amount(self.amount, &self.currency)
    }
}

fn format_amount(amount: u64, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.to_ascii_lowercase().as_str()) {
        format!("{amount} {code}")
    } else {
        format!("{}.{:02} {code}", amount / 100, amount % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payment(amount: u64, refunded: u64, currency: &str, status: u8) -> Payment {
        serde_json::from_value(json!({
            "id": "1093226011227390464",
            "amount": amount,
            "amount_refunded": refunded,
            "tax": 0,
            "tax_inclusive": true,
            "currency": currency,
            "status": status,
            "description": "Nitro Monthly",
            "sku_id": "521842865731534868",
            "sku_price": amount,
            "payment_gateway": 1,
            "flags": 0
        }))
        .unwrap()
    }

    #[test]
    fn display_amounts() {
        assert_eq!(payment(1299, 0, "usd", 1).display_amount(), "12.99 USD");
        assert_eq!(payment(500, 0, "eur", 1).display_amount(), "5.00 EUR");
        assert_eq!(payment(1200, 0, "jpy", 1).display_amount(), "1200 JPY");
    }

    #[test]
    fn refunds() {
        let partial = payment(1000, 250, "usd", 1);
        assert!(partial.is_partially_refunded());
        assert!(!partial.is_refunded());
        assert_eq!(partial.net_amount(), 750);

        let full = payment(1000, 1000, "usd", 4);
        assert!(full.is_refunded());
        assert!(!full.is_partially_refunded());
        assert_eq!(full.net_amount(), 0);
    }

    #[test]
    fn gateway_tags() {
        let p = payment(1, 0, "usd", 0);
        assert_eq!(p.payment_gateway, Some(PaymentGateway::Stripe));
        assert_eq!(p.status, PaymentStatus::Pending);
        let gw: PaymentGateway = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(gw, PaymentGateway::Unknown(42));
        assert_eq!(serde_json::to_value(gw).unwrap(), json!(42));
    }

    #[test]
    fn unknown_status_and_gateway_are_kept() {
        let p = payment(100, 0, "usd", 9);
        assert_eq!(p.status, PaymentStatus::Unknown(9));
        assert!(!p.is_refunded());
        let gateway: PaymentGateway = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(gateway, PaymentGateway::Unknown(42));
        assert_eq!(serde_json::to_value(PaymentGateway::Adyen).unwrap(), json!(5));
    }
}

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::quote_status::QuoteStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub number: String,
    pub title: String,
    pub status: QuoteStatus,
    pub client_id: Option<ObjectId>,
    #[serde(default)]
    pub tasks: Vec<QuoteTask>,
    pub valid_until: Option<NaiveDate>,
    pub conditions: Option<String>,
    #[serde(default)]
    pub totals: QuoteTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
}

impl Quote {
    /// Stamps the timestamp matching the status the quote just entered.
    pub fn apply_status(&mut self, status: QuoteStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
        let slot = match status {
            QuoteStatus::Draft => return,
            QuoteStatus::Sent => &mut self.sent_at,
            QuoteStatus::Viewed => &mut self.viewed_at,
            QuoteStatus::Accepted => &mut self.accepted_at,
            QuoteStatus::Rejected => &mut self.rejected_at,
            QuoteStatus::Expired => &mut self.expired_at,
            QuoteStatus::ConvertedToInvoice => &mut self.converted_at,
        };
        slot.get_or_insert(at);
    }

    pub fn is_past_validity(&self, today: NaiveDate) -> bool {
        self.valid_until.is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingType {
    #[default]
    Flat,
    Hourly,
}

/// A line posted without a quantity counts once
pub fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteTask {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    /// Hours of work, hourly pricing only
    pub duration: Option<Decimal>,
    #[serde(default)]
    pub pricing_type: PricingType,
    #[serde(default)]
    pub materials: Vec<QuoteMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteMaterial {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    pub unit: Option<String>,
}

/// Financial breakdown of a quote. Every amount has two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuoteTotals {
    pub total_before_vat: Decimal,
    pub vat_amount: Decimal,
    pub total_with_vat: Decimal,
    pub deposit_amount: Decimal,
    pub balance_amount: Decimal,
    pub discount_amount: Decimal,
}

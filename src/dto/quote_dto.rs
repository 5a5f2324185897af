use std::collections::BTreeMap;

use crate::model::client::Client;
use crate::model::financial_config::FinancialSettings;
use crate::model::follow_up::FollowUp;
use crate::model::quote::{default_quantity, PricingType, Quote, QuoteMaterial, QuoteTask, QuoteTotals};
use crate::model::quote_event::QuoteEvent;
use crate::model::quote_file::QuoteFile;
use crate::model::quote_signature::QuoteSignature;
use crate::model::quote_status::QuoteStatus;
use crate::service::quote_calculator::MAX_AMOUNT;
use bson::oid::ObjectId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::{Validate, ValidationError};

/// A file received through a multipart upload
#[derive(Debug, Clone)]
pub struct File {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub size: usize,
}

/// Non-negative and small enough for the calculator to multiply safely
fn bounded_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

// --- Validated DTOs for request validation ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MaterialRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(default = "default_quantity")]
    #[validate(custom(function = "bounded_amount"))]
    pub quantity: Decimal,

    #[serde(default)]
    #[validate(custom(function = "bounded_amount"))]
    pub unit_price: Decimal,

    #[validate(length(max = 20))]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    #[serde(default = "default_quantity")]
    #[validate(custom(function = "bounded_amount"))]
    pub quantity: Decimal,

    #[serde(default)]
    #[validate(custom(function = "bounded_amount"))]
    pub unit_price: Decimal,

    #[validate(custom(function = "bounded_amount"))]
    pub duration: Option<Decimal>,

    #[serde(default)]
    pub pricing_type: PricingType,

    #[serde(default)]
    #[validate(nested)]
    pub materials: Vec<MaterialRequest>,
}

impl From<TaskRequest> for QuoteTask {
    fn from(req: TaskRequest) -> Self {
        QuoteTask {
            description: req.description,
            quantity: req.quantity,
            unit_price: req.unit_price,
            duration: req.duration,
            pricing_type: req.pricing_type,
            materials: req
                .materials
                .into_iter()
                .map(|m| QuoteMaterial {
                    name: m.name,
                    quantity: m.quantity,
                    unit_price: m.unit_price,
                    unit: m.unit,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(equal = 24))] // MongoDB ObjectId hex string
    pub client_id: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub tasks: Vec<TaskRequest>,

    pub valid_until: Option<NaiveDate>,

    #[validate(length(max = 10000))]
    pub conditions: Option<String>,
}

/// Partial update, absent fields are kept
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(equal = 24))]
    pub client_id: Option<String>,

    #[validate(nested)]
    pub tasks: Option<Vec<TaskRequest>>,

    pub valid_until: Option<NaiveDate>,

    #[validate(length(max = 10000))]
    pub conditions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SendQuoteRequest {
    /// Overrides the client's address
    #[validate(email)]
    pub recipient_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
    pub search: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Dashboard filter, every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub client_id: Option<ObjectId>,
    pub search: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl QuoteFilter {
    pub fn matches(&self, quote: &Quote) -> bool {
        if self.status.is_some_and(|s| s != quote.status) {
            return false;
        }
        if self.client_id.is_some() && self.client_id != quote.client_id {
            return false;
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !quote.number.to_lowercase().contains(&needle)
                && !quote.title.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        let created = quote.created_at.date_naive();
        if self.created_from.is_some_and(|from| created < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| created > to) {
            return false;
        }
        true
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct QuoteListResponse {
    pub items: Vec<Quote>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QuoteStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    /// Sum of accepted and invoiced quotes, VAT included
    pub accepted_amount: Decimal,
    /// Sum of quotes still waiting on the client, VAT included
    pub pending_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BulkAction {
    Delete,
    MarkAsSent,
    ConvertToInvoice,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkActionRequest {
    pub action: BulkAction,

    #[validate(length(min = 1, max = 100))]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkItemResult {
    pub id: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkActionResponse {
    pub action: BulkAction,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteFileResponse {
    #[serde(flatten)]
    pub file: QuoteFile,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureResponse {
    #[serde(flatten)]
    pub signature: QuoteSignature,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialConfigResponse {
    pub quote_id: ObjectId,
    pub settings: FinancialSettings,
    pub totals: QuoteTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteDetailResponse {
    pub quote: Quote,
    pub client: Option<Client>,
    pub financial_settings: Option<FinancialSettings>,
    pub files: Vec<QuoteFileResponse>,
    pub signatures: Vec<SignatureResponse>,
    /// Follow-up picked for display, if the quote has any
    pub follow_up: Option<FollowUp>,
    pub events: Vec<QuoteEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn quote(number: &str, title: &str, status: QuoteStatus) -> Quote {
        let created = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        Quote {
            id: Some(ObjectId::new()),
            user_id: "user-1".to_string(),
            number: number.to_string(),
            title: title.to_string(),
            status,
            client_id: None,
            tasks: vec![],
            valid_until: None,
            conditions: None,
            totals: QuoteTotals::default(),
            created_at: created,
            updated_at: created,
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            rejected_at: None,
            expired_at: None,
            converted_at: None,
        }
    }

    #[test]
    fn test_filter_by_search_and_status() {
        let q = quote("DEV-2024-0007", "Kitchen tiling", QuoteStatus::Sent);
        let filter = QuoteFilter {
            search: Some("kitchen".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&q));

        let filter = QuoteFilter {
            search: Some("0007".to_string()),
            status: Some(QuoteStatus::Draft),
            ..Default::default()
        };
        assert!(!filter.matches(&q));
    }

    #[test]
    fn test_filter_by_date_range() {
        let q = quote("DEV-2024-0001", "Roof", QuoteStatus::Draft);
        let filter = QuoteFilter {
            created_from: NaiveDate::from_ymd_opt(2024, 3, 10),
            created_to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        assert!(filter.matches(&q));

        let filter = QuoteFilter {
            created_from: NaiveDate::from_ymd_opt(2024, 3, 11),
            ..Default::default()
        };
        assert!(!filter.matches(&q));
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let task = TaskRequest {
            description: "Paint".to_string(),
            quantity: dec!(1),
            unit_price: dec!(-10),
            duration: None,
            pricing_type: PricingType::Flat,
            materials: vec![],
        };
        assert!(task.validate().is_err());

        let task = TaskRequest {
            unit_price: dec!(10),
            ..task
        };
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let task: TaskRequest = serde_json::from_value(serde_json::json!({
            "description": "Paint",
            "quantity": "79228162514264337593543950335",
            "unit_price": "10"
        }))
        .unwrap();
        assert!(task.validate().is_err());

        let task = TaskRequest {
            quantity: MAX_AMOUNT,
            ..task
        };
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_missing_quantity_counts_once() {
        let task: TaskRequest = serde_json::from_value(serde_json::json!({
            "description": "Paint",
            "unit_price": "10",
            "materials": [{ "name": "Primer", "unit_price": "4" }]
        }))
        .unwrap();
        assert_eq!(task.quantity, Decimal::ONE);
        assert_eq!(task.materials[0].quantity, Decimal::ONE);
    }
}
